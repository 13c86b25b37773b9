//! Demo data
//!
//! Three accounts with very different habits and eight rated resources,
//! enough to exercise every tier and most search paths.

use crate::node::Node;
use stacks_core::{AccountId, PeerId, Resource, Result};

#[derive(Clone, Copy)]
enum Owner {
    Alice,
    Bob,
    Charlie,
}

struct DemoResource {
    owner: Owner,
    filename: &'static str,
    title: &'static str,
    subject: &'static str,
    tags: &'static [&'static str],
}

const DEMO_RESOURCES: &[DemoResource] = &[
    DemoResource {
        owner: Owner::Alice,
        filename: "golang_tutorial.pdf",
        title: "Go Programming Fundamentals",
        subject: "Computer Science",
        tags: &["golang", "programming", "tutorial"],
    },
    DemoResource {
        owner: Owner::Alice,
        filename: "data_structures.pdf",
        title: "Data Structures and Algorithms",
        subject: "Computer Science",
        tags: &["algorithms", "dsa", "programming"],
    },
    DemoResource {
        owner: Owner::Bob,
        filename: "calculus_notes.pdf",
        title: "Calculus Complete Notes",
        subject: "Mathematics",
        tags: &["calculus", "math", "notes"],
    },
    DemoResource {
        owner: Owner::Alice,
        filename: "physics_mechanics.pdf",
        title: "Classical Mechanics",
        subject: "Physics",
        tags: &["physics", "mechanics"],
    },
    DemoResource {
        owner: Owner::Bob,
        filename: "database_design.pdf",
        title: "Database Design Principles",
        subject: "Computer Science",
        tags: &["database", "sql", "design"],
    },
    DemoResource {
        owner: Owner::Alice,
        filename: "linear_algebra.pdf",
        title: "Linear Algebra Essentials",
        subject: "Mathematics",
        tags: &["algebra", "math", "linear"],
    },
    DemoResource {
        owner: Owner::Charlie,
        filename: "networking_basics.pdf",
        title: "Computer Networks Basics",
        subject: "Computer Science",
        tags: &["networking", "tcp", "protocols"],
    },
    DemoResource {
        owner: Owner::Bob,
        filename: "chemistry_organic.pdf",
        title: "Organic Chemistry Guide",
        subject: "Chemistry",
        tags: &["chemistry", "organic"],
    },
];

/// Populate `node` with the demo accounts and resources
pub fn seed_demo(node: &Node) -> Result<()> {
    let alice = node.accounts.create_account("alice", "alice@university.edu")?;
    let bob = node.accounts.create_account("bob", "bob@university.edu")?;
    let charlie = node.accounts.create_account("charlie", "charlie@university.edu")?;

    // alice: contributor
    repeat(25, || node.accounts.record_upload(&alice.id).map(drop))?;

    // bob: neutral
    repeat(10, || node.accounts.record_upload(&bob.id).map(drop))?;
    repeat(5, || node.accounts.record_download(&bob.id).map(drop))?;

    // charlie: leecher
    repeat(3, || node.accounts.record_upload(&charlie.id).map(drop))?;
    repeat(30, || node.accounts.record_download(&charlie.id).map(drop))?;

    for demo in DEMO_RESOURCES {
        let owner = match demo.owner {
            Owner::Alice => &alice,
            Owner::Bob => &bob,
            Owner::Charlie => &charlie,
        };
        let mut resource = Resource::new(demo.filename, 1024 * 1024, owner.id.clone());
        resource.title = demo.title.to_string();
        resource.subject = demo.subject.to_string();
        resource.description = format!("Sample resource for {}", demo.title);
        for tag in demo.tags {
            resource.add_tag(*tag);
        }
        resource.add_peer(peer_for(&owner.id));
        resource.add_rating(4.0)?;
        resource.add_rating(4.5)?;
        node.library.upload(resource)?;
    }

    tracing::info!(
        "Seeded 3 accounts and {} resources",
        DEMO_RESOURCES.len()
    );
    Ok(())
}

fn peer_for(account: &AccountId) -> PeerId {
    PeerId::new(format!("peer-{}", account))
}

fn repeat(times: usize, mut f: impl FnMut() -> Result<()>) -> Result<()> {
    for _ in 0..times {
        f()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use stacks_core::Tier;

    #[test]
    fn test_seed_demo_tiers() {
        let node = Node::new(&Config::default());
        seed_demo(&node).unwrap();

        assert_eq!(node.store.counts().unwrap(), (8, 3, 0));

        let alice = node.accounts.get_account_by_username("alice").unwrap();
        // 25 seeded uploads + 4 resources
        assert_eq!(alice.uploads, 29);
        assert_eq!(alice.tier, Tier::Contributor);

        let bob = node.accounts.get_account_by_username("bob").unwrap();
        assert_eq!(bob.score, 13 * 2 - 5);
        assert_eq!(bob.tier, Tier::Neutral);

        let charlie = node.accounts.get_account_by_username("charlie").unwrap();
        assert_eq!(charlie.score, 4 * 2 - 30);
        assert_eq!(charlie.tier, Tier::Leecher);
    }

    #[test]
    fn test_seed_demo_owners() {
        let node = Node::new(&Config::default());
        seed_demo(&node).unwrap();

        let titles = |username: &str| -> Vec<String> {
            let account = node.accounts.get_account_by_username(username).unwrap();
            let mut titles: Vec<String> = node
                .library
                .library_of(&account.id)
                .unwrap()
                .into_iter()
                .map(|r| r.title)
                .collect();
            titles.sort();
            titles
        };

        assert_eq!(titles("alice").len(), 4);
        assert_eq!(
            titles("bob"),
            vec![
                "Calculus Complete Notes",
                "Database Design Principles",
                "Organic Chemistry Guide"
            ]
        );
        assert_eq!(titles("charlie"), vec!["Computer Networks Basics"]);
    }
}
