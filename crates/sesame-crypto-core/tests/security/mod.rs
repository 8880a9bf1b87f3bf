mod entropy_quality;
mod masked_debug;
mod mlock_verification;
mod zeroize_on_drop;
