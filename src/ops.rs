pub mod delay_subscription;
