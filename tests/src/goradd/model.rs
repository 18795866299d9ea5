use super::{PersonType, ProjectStatusType};
use quarry::{schema::ColumnType, Error, Query, Record, Result, Row, Value};

macro_rules! record {
    ($name:ident, $table:literal) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(Row);

        impl Record for $name {
            const TABLE: &'static str = $table;
            const PK: &'static str = "id";

            fn from_row(row: Row) -> Self {
                $name(row)
            }

            fn row(&self) -> &Row {
                &self.0
            }

            fn row_mut(&mut self) -> &mut Row {
                &mut self.0
            }

            fn into_row(self) -> Row {
                self.0
            }
        }

        impl $name {
            pub fn new() -> Self {
                <Self as Record>::new_record()
            }

            pub fn query() -> Query<$name> {
                Query::new()
            }

            pub fn id(&self) -> Result<i64> {
                self.0.get("id")?.to_i64()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }
    };
}

record!(Person, "person");
record!(Login, "login");
record!(Address, "address");
record!(Project, "project");
record!(Milestone, "milestone");

fn string(row: &Row, column: &str) -> Result<String> {
    match row.get(column)?.clone().coerce(ColumnType::String)? {
        Value::String(value) => Ok(value),
        other => Err(Error::type_conversion(other, "String")),
    }
}

fn optional_string(row: &Row, column: &str) -> Result<Option<String>> {
    match row.get(column)? {
        Value::Null => Ok(None),
        _ => string(row, column).map(Some),
    }
}

fn reference<R: Record>(row: &Row, edge: &str) -> Option<R> {
    row.reference(edge).cloned().map(R::from_row)
}

fn members<R: Record>(row: &Row, edge: &str) -> Vec<R> {
    row.collection(edge)
        .map(|collection| collection.iter().cloned().map(R::from_row).collect())
        .unwrap_or_default()
}

impl Person {
    pub fn first_name(&self) -> Result<String> {
        string(&self.0, "first_name")
    }

    pub fn set_first_name(&mut self, value: impl Into<String>) {
        self.0.set("first_name", value.into());
    }

    pub fn last_name(&self) -> Result<String> {
        string(&self.0, "last_name")
    }

    pub fn set_last_name(&mut self, value: impl Into<String>) {
        self.0.set("last_name", value.into());
    }

    pub fn login(&self) -> Option<Login> {
        reference(&self.0, "login")
    }

    pub fn addresses(&self) -> Vec<Address> {
        members(&self.0, "addresses")
    }

    pub fn set_addresses(&mut self, addresses: Vec<Address>) {
        self.0
            .set_collection("addresses", addresses.into_iter().map(Record::into_row).collect());
    }

    pub fn projects_as_manager(&self) -> Vec<Project> {
        members(&self.0, "projects_as_manager")
    }

    pub fn projects(&self) -> Vec<Project> {
        members(&self.0, "projects")
    }

    pub fn set_projects(&mut self, projects: Vec<Project>) {
        self.0
            .set_collection("projects", projects.into_iter().map(Record::into_row).collect());
    }

    pub fn person_types(&self) -> Result<Vec<PersonType>> {
        self.0
            .collection("person_types")
            .into_iter()
            .flatten()
            .map(|row| PersonType::try_from(row.get("id")?.clone()))
            .collect()
    }
}

impl Login {
    pub fn username(&self) -> Result<String> {
        string(&self.0, "username")
    }

    pub fn set_username(&mut self, value: impl Into<String>) {
        self.0.set("username", value.into());
    }

    pub fn person(&self) -> Option<Person> {
        reference(&self.0, "person")
    }
}

impl Address {
    pub fn street(&self) -> Result<String> {
        string(&self.0, "street")
    }

    pub fn set_street(&mut self, value: impl Into<String>) {
        self.0.set("street", value.into());
    }

    pub fn city(&self) -> Result<Option<String>> {
        optional_string(&self.0, "city")
    }

    pub fn set_city(&mut self, value: impl Into<String>) {
        self.0.set("city", value.into());
    }

    pub fn person_id(&self) -> Result<i64> {
        self.0.get("person_id")?.to_i64()
    }
}

impl Project {
    pub fn name(&self) -> Result<String> {
        string(&self.0, "name")
    }

    pub fn set_name(&mut self, value: impl Into<String>) {
        self.0.set("name", value.into());
    }

    pub fn num(&self) -> Result<i64> {
        self.0.get("num")?.to_i64()
    }

    pub fn set_num(&mut self, value: i32) {
        self.0.set("num", value);
    }

    pub fn status_type(&self) -> Result<ProjectStatusType> {
        ProjectStatusType::try_from(self.0.get("status_type_id")?.clone())
    }

    pub fn set_status_type(&mut self, value: ProjectStatusType) {
        self.0.set("status_type_id", value);
    }

    pub fn spent(&self) -> Result<Option<f64>> {
        match self.0.get("spent")? {
            Value::Null => Ok(None),
            value => value.to_f64().map(Some),
        }
    }

    pub fn manager(&self) -> Option<Person> {
        reference(&self.0, "manager")
    }

    pub fn set_manager(&mut self, manager: Option<Person>) {
        self.0.set_reference("manager", manager.map(Record::into_row));
    }

    pub fn milestones(&self) -> Vec<Milestone> {
        members(&self.0, "milestones")
    }

    pub fn team_members(&self) -> Vec<Person> {
        members(&self.0, "team_members")
    }

    pub fn set_team_members(&mut self, people: Vec<Person>) {
        self.0
            .set_collection("team_members", people.into_iter().map(Record::into_row).collect());
    }
}

impl Milestone {
    pub fn name(&self) -> Result<String> {
        string(&self.0, "name")
    }

    pub fn project(&self) -> Option<Project> {
        reference(&self.0, "project")
    }
}
