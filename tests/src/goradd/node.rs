//! Node accessors: `node::project().manager().last_name()`.

use quarry::Node;

macro_rules! node_type {
    ($name:ident { $( $column:ident ),* $(,)? }) => {
        #[derive(Debug, Clone, PartialEq)]
        pub struct $name(Node);

        impl $name {
            $(
                pub fn $column(&self) -> Node {
                    self.0.column(stringify!($column))
                }
            )*

            pub fn node(&self) -> &Node {
                &self.0
            }
        }

        impl From<$name> for Node {
            fn from(value: $name) -> Node {
                value.0
            }
        }

        impl From<&$name> for Node {
            fn from(value: &$name) -> Node {
                value.0.clone()
            }
        }
    };
}

node_type!(PersonNode { id, first_name, last_name });
node_type!(LoginNode { id, person_id, username, password, is_enabled });
node_type!(AddressNode { id, person_id, street, city });
node_type!(ProjectNode {
    id,
    num,
    status_type_id,
    manager_id,
    name,
    description,
    start_date,
    end_date,
    budget,
    spent,
});
node_type!(MilestoneNode { id, project_id, name });

pub fn person() -> PersonNode {
    PersonNode(Node::table("person", "id"))
}

pub fn login() -> LoginNode {
    LoginNode(Node::table("login", "id"))
}

pub fn address() -> AddressNode {
    AddressNode(Node::table("address", "id"))
}

pub fn project() -> ProjectNode {
    ProjectNode(Node::table("project", "id"))
}

pub fn milestone() -> MilestoneNode {
    MilestoneNode(Node::table("milestone", "id"))
}

impl PersonNode {
    pub fn login(&self) -> LoginNode {
        LoginNode(self.0.reverse("login", "id", "login", "person_id", "id", false))
    }

    pub fn addresses(&self) -> AddressNode {
        AddressNode(self.0.reverse("addresses", "id", "address", "person_id", "id", true))
    }

    pub fn projects_as_manager(&self) -> ProjectNode {
        ProjectNode(self.0.reverse(
            "projects_as_manager",
            "id",
            "project",
            "manager_id",
            "id",
            true,
        ))
    }

    pub fn projects(&self) -> ProjectNode {
        ProjectNode(self.0.many_many(
            "projects",
            "team_member_project_assn",
            "team_member_id",
            "project_id",
            "project",
            "id",
            false,
        ))
    }

    /// Enumeration rows linked through `person_persontype_assn`.
    pub fn person_types(&self) -> Node {
        self.0.many_many(
            "person_types",
            "person_persontype_assn",
            "person_id",
            "person_type_id",
            "person_type",
            "id",
            true,
        )
    }
}

impl LoginNode {
    pub fn person(&self) -> PersonNode {
        PersonNode(self.0.reference("person", "person_id", "person", "id", "id"))
    }
}

impl AddressNode {
    pub fn person(&self) -> PersonNode {
        PersonNode(self.0.reference("person", "person_id", "person", "id", "id"))
    }
}

impl ProjectNode {
    pub fn manager(&self) -> PersonNode {
        PersonNode(self.0.reference("manager", "manager_id", "person", "id", "id"))
    }

    pub fn milestones(&self) -> MilestoneNode {
        MilestoneNode(self.0.reverse("milestones", "id", "milestone", "project_id", "id", true))
    }

    pub fn team_members(&self) -> PersonNode {
        PersonNode(self.0.many_many(
            "team_members",
            "team_member_project_assn",
            "project_id",
            "team_member_id",
            "person",
            "id",
            false,
        ))
    }
}

impl MilestoneNode {
    pub fn project(&self) -> ProjectNode {
        ProjectNode(self.0.reference("project", "project_id", "project", "id", "id"))
    }
}
