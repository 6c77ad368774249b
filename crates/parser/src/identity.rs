//! Type identity resolution
//!
//! Kubernetes definition names encode their origin in a dotted path:
//!
//! - `io.k8s.api.<group>.<version>.<Kind>` (e.g. `io.k8s.api.apps.v1.Deployment`)
//! - `<origin>.pkg.apis.<group>.<version>.<Kind>` (e.g. `io.k8s.apimachinery.pkg.apis.meta.v1.ObjectMeta`)
//! - `<origin>.pkg.api.<version>.<Kind>` for core helpers (e.g. `io.k8s.apimachinery.pkg.api.resource.Quantity`)
//! - `<origin>.pkg.util.<pkg>.<Kind>` and `<origin>.pkg.<pkg>.<Kind>` for structural helpers
//!   without an API group

use tosca_typegen_common::TypeIdentity;

/// Group of the core API and of `pkg.api` helper types
pub const CORE_GROUP: &str = "core";

/// Group of the shared object metadata types
pub const META_GROUP: &str = "meta";

/// Version token of `io.k8s.apimachinery.pkg.api.resource.*`
pub const RESOURCE_VERSION: &str = "resource";

/// Resolve `(group, version, kind)` from a fully-qualified definition name.
///
/// Returns `None` for structural helper types (`pkg.util.*`, `pkg.runtime.*`,
/// `pkg.version.*`) that carry no API group, and the error identity for names
/// matching no known convention.
pub fn resolve_identity(name: &str) -> Option<TypeIdentity> {
    let parts: Vec<&str> = name.split('.').collect();
    let n = parts.len();
    if n < 4 {
        return Some(TypeIdentity::error());
    }

    let kind = parts[n - 1];
    let version = parts[n - 2];

    match (parts[n - 4], parts[n - 3]) {
        (_, "api") => Some(TypeIdentity::new(CORE_GROUP, version, kind)),
        ("api" | "apis", group) => Some(TypeIdentity::new(group, version, kind)),
        (_, "util" | "pkg") => None,
        _ => Some(TypeIdentity::error()),
    }
}
