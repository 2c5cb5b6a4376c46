pub mod group_access;
pub mod navigation;
pub mod permission;

pub use group_access::GroupAccessInfo;
pub use navigation::{BreadcrumbItem, RouteCategory, RouteDescriptor, RouteGroup};
pub use permission::{Action, Module, UserPermissions};
