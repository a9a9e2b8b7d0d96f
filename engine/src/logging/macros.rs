/// Scoped logging: `scoped_log!(DEBUG, "vr", "teleported to {:?}", dest)`.
/// The level is one of the `tracing::Level` constants.
#[macro_export]
macro_rules! scoped_log {
    ($level:ident, $scope:expr, $($arg:tt)*) => {
        if $crate::logging::get_log_config().should_log($scope, $crate::logging::Level::$level) {
            $crate::logging::event!($crate::logging::Level::$level, scope = $scope, $($arg)*);
        }
    };
}

// Convenience macros for the navigation scopes

#[macro_export]
macro_rules! spatial_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "spatial", $($arg)*)
    };
}

#[macro_export]
macro_rules! desktop_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "desktop", $($arg)*)
    };
}

#[macro_export]
macro_rules! vr_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "vr", $($arg)*)
    };
}

#[macro_export]
macro_rules! session_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "session", $($arg)*)
    };
}

#[macro_export]
macro_rules! input_log {
    ($level:ident, $($arg:tt)*) => {
        $crate::scoped_log!($level, "input", $($arg)*)
    };
}
