//! Log macros routed to `tracing` when the feature is on.
//! Without it they only type-check their arguments.

#[cfg(feature = "tracing")]
macro_rules! debug {
    ($($t: tt)*) => { tracing::debug!($($t)*) };
}

#[cfg(feature = "tracing")]
macro_rules! info {
    ($($t: tt)*) => { tracing::info!($($t)*) };
}

#[cfg(feature = "tracing")]
macro_rules! warn {
    ($($t: tt)*) => { tracing::warn!($($t)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug {
    ($($t: tt)*) => {{ let _ = format_args!($($t)*); }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! info {
    ($($t: tt)*) => {{ let _ = format_args!($($t)*); }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn {
    ($($t: tt)*) => {{ let _ = format_args!($($t)*); }};
}
