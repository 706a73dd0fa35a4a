mod core;

mod alloc;

mod std;

#[cfg(feature = "jiff02")]
mod jiff;
