//! Core interface trait

use crate::error::Result;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// Shared handle to a published interface object
pub type InterfaceHandle = Arc<dyn Interface>;

/// Upcast to [`Any`] so handles can be downcast to their concrete type
pub trait AsAny: Any + Send + Sync {
    /// Borrow as `&dyn Any`
    fn as_any(&self) -> &dyn Any;

    /// Convert a shared handle into `Arc<dyn Any>`
    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn into_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// A named capability a module publishes for other modules to use
///
/// The object manager calls [`create`](Interface::create) exactly once before
/// the interface becomes visible, and [`destroy`](Interface::destroy) when it
/// is torn down. Both run with the registry lock released, so implementations
/// may call back into the object manager.
pub trait Interface: AsAny + fmt::Debug {
    /// Prepare the interface for use
    ///
    /// An error here aborts publication; the interface is never registered.
    fn create(&self) -> Result<()>;

    /// Release whatever `create` acquired
    ///
    /// There is no error channel: table removal proceeds regardless.
    fn destroy(&self);

    /// Concrete type name, used for diagnostics
    fn type_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Returns true if both handles refer to the same interface object
pub fn same_interface(a: &InterfaceHandle, b: &InterfaceHandle) -> bool {
    // Compare data pointers only; vtable pointers may differ across codegen units.
    std::ptr::eq(
        Arc::as_ptr(a) as *const (),
        Arc::as_ptr(b) as *const (),
    )
}

/// Downcast a shared handle to its concrete interface type
///
/// Returns `None` if the object is not a `T`; the handle is left untouched.
pub fn downcast_interface<T: Interface>(handle: &InterfaceHandle) -> Option<Arc<T>> {
    // Through the trait object: `Arc<dyn Interface>` itself also implements `AsAny`.
    AsAny::into_any_arc(Arc::clone(handle)).downcast::<T>().ok()
}
