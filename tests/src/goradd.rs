//! The sample "goradd" database as the code generator emits it: the schema
//! model, node accessors, typed records and enumeration constants.

mod model;
pub use model::{Address, Login, Milestone, Person, Project};

pub mod node;

mod schema;
pub use schema::{schema, schema_without_fk};

quarry::type_table! {
    /// Roles a person can hold
    pub enum PersonType in "person_type" {
        Contractor = 1 => "Contractor",
        Manager = 2 => "Manager",
        Inactive = 3 => "Inactive",
        CompanyCar = 4 => "Company Car",
        WorksFromHome = 5 => "Works From Home",
    }
}

quarry::type_table! {
    pub enum ProjectStatusType in "project_status_type" {
        Open = 1 => "Open",
        Cancelled = 2 => "Cancelled",
        Completed = 3 => "Completed",
        Planned = 4 => "Planned",
    }
}
