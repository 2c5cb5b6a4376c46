pub mod access_context;
pub mod classifier;
pub mod group_access_resolver;
pub mod invalidation;
pub mod navigation_resolver;
pub mod permission_resolver;
pub mod session_registry;
pub mod ttl_cache;

pub use access_context::AccessContext;
pub use group_access_resolver::GroupAccessResolver;
pub use navigation_resolver::NavigationResolver;
pub use permission_resolver::PermissionResolver;
pub use session_registry::SessionRegistry;
