//! Scenarios against the goradd sample database. Run with
//! `cargo test -p tests --test live -- --ignored` after setting
//! `QUARRY_TEST_MYSQL_URL` and/or `QUARRY_TEST_POSTGRESQL_URL`.

use pretty_assertions::assert_eq;
use quarry::{ops, Context, Node, Record};
use tests::{
    goradd::{node, Address, Milestone, Person, Project},
    live,
};

fn address(street: &str, city: &str) -> Address {
    let mut address = Address::new();
    address.set_street(street);
    address.set_city(city);
    address
}

#[tokio::test]
#[ignore]
async fn people_managed_by_wolfe() {
    let people = node::person();

    for db in live::databases().unwrap() {
        let mut cx = Context::new();
        let found = Person::query()
            .order_by([people.last_name(), people.first_name()])
            .filter(ops::equal(people.projects().manager().last_name(), "Wolfe"))
            .distinct()
            .load(&db, &mut cx)
            .await
            .unwrap();

        let names: Vec<String> = found
            .iter()
            .map(|p| format!("{} {}", p.first_name().unwrap(), p.last_name().unwrap()))
            .collect();
        assert_eq!(
            names,
            [
                "Brett Carlisle",
                "John Doe",
                "Samantha Jones",
                "Jacob Pratt",
                "Kendall Public",
                "Ben Robinson",
                "Alex Smith",
                "Wendy Smith",
                "Karen Wolfe",
            ]
        );
    }
}

#[tokio::test]
#[ignore]
async fn first_milestone_and_its_manager() {
    let milestone = node::milestone();

    for db in live::databases().unwrap() {
        let mut cx = Context::new();
        let milestones = Milestone::query()
            .join(milestone.project().manager())
            .filter(ops::equal(milestone.id(), 1_i64))
            .load(&db, &mut cx)
            .await
            .unwrap();

        let first = &milestones[0];
        assert_eq!(first.name().unwrap(), "Milestone A");
        let manager = first.project().unwrap().manager().unwrap();
        assert_eq!(manager.first_name().unwrap(), "Karen");
    }
}

#[tokio::test]
#[ignore]
async fn saved_person_round_trips_and_cascades() {
    let people = node::person();
    let addresses = node::address();

    for db in live::databases().unwrap() {
        let mut cx = Context::new();

        let mut person = Person::new();
        person.set_first_name("Martin");
        person.set_last_name("Luther");
        person.set_addresses(vec![
            address("My Street", "Eisleben"),
            address("All Saints Church", "Wittenburg"),
        ]);
        person.save(&db, &mut cx).await.unwrap();
        let id = person.id().unwrap();

        let loaded = Person::query()
            .join(people.addresses())
            .filter(ops::equal(people.id(), id))
            .order_by([people.addresses().id()])
            .load(&db, &mut cx)
            .await
            .unwrap();
        assert_eq!(loaded.len(), 1);

        let streets: Vec<String> = loaded[0]
            .addresses()
            .iter()
            .map(|a| a.street().unwrap())
            .collect();
        assert_eq!(streets, ["My Street", "All Saints Church"]);

        person.delete(&db, &mut cx).await.unwrap();

        let left = Address::query()
            .filter(ops::equal(addresses.person_id(), id))
            .count(&db, &mut cx, false, Vec::<Node>::new())
            .await
            .unwrap();
        assert_eq!(left, 0);
    }
}

#[tokio::test]
#[ignore]
async fn distinct_last_names() {
    let people = node::person();

    for db in live::databases().unwrap() {
        let mut cx = Context::new();
        let count = Person::query()
            .count(&db, &mut cx, true, [people.last_name()])
            .await
            .unwrap();
        assert_eq!(count, 10);
    }
}

#[tokio::test]
#[ignore]
async fn spending_by_status() {
    let project = node::project();

    for db in live::databases().unwrap() {
        let mut cx = Context::new();

        let sums = Project::query()
            .group_by([project.status_type_id()])
            .alias("total", ops::sum(project.spent()))
            .order_by([project.status_type_id()])
            .load_untyped(&db, &mut cx)
            .await
            .unwrap();
        assert_eq!(sums[0].alias("total").unwrap().to_f64().unwrap(), 77400.5);

        let mins = Project::query()
            .group_by([project.status_type_id()])
            .alias("total", ops::min(project.spent()))
            .order_by([project.status_type_id()])
            .load_untyped(&db, &mut cx)
            .await
            .unwrap();
        assert_eq!(mins[0].alias("total").unwrap().to_f64().unwrap(), 4200.5);
    }
}

#[tokio::test]
#[ignore]
async fn project_json_names_its_manager() {
    let project = node::project();

    for db in live::databases().unwrap() {
        let mut cx = Context::new();
        let loaded = Project::query()
            .select([
                project.name(),
                project.status_type_id(),
                project.manager().first_name(),
            ])
            .filter(ops::equal(project.id(), 1_i64))
            .load(&db, &mut cx)
            .await
            .unwrap();

        let text = serde_json::to_string(&loaded[0].to_json(db.schema()).unwrap()).unwrap();
        let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(&text).unwrap();
        assert_eq!(map["name"], "ACME Website Redesign");
        assert_eq!(map["statusType"], "Completed");
        assert_eq!(map["manager"]["firstName"], "Karen");
    }
}
