//! Route modules mounted at startup.
//!
//! Every file in this directory is a route module. To add one, create the
//! file, export `pub static MODULE` implementing
//! [`RouteModule`](crate::discovery::RouteModule) and add its name to the
//! `route_modules!` list below. The module name is the catalog key, so it
//! decides where the router lands in the mount order.

use crate::discovery::ModuleEntry;

/// Declare route modules and collect them into [`CATALOG`].
macro_rules! route_modules {
    ($($name:ident),* $(,)?) => {
        $(pub mod $name;)*

        /// Every route module compiled into the service.
        pub static CATALOG: &[ModuleEntry] = &[
            $(ModuleEntry::new(stringify!($name), &$name::MODULE),)*
        ];
    };
}

route_modules! {
    health,
    items,
}
