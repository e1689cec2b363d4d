pub mod department;
pub mod user;

// Re-export core models for easy access
pub use department::{
    DepartmentPage, DepartmentPatch, DepartmentRecord, NewDepartment, RemoteDepartment,
};
pub use user::{NewUser, RemoteUser, UserName, UserRecord};
