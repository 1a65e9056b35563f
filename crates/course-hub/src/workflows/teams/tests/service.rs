use std::sync::Arc;

use crate::persistence::{MemoryStore, RepositoryError};
use crate::workflows::courses::CourseId;
use crate::workflows::messages;
use crate::workflows::teams::{NewTeam, TeamId, TeamPatch, TeamService};
use crate::workflows::testing::*;
use crate::workflows::users::UserId;
use crate::workflows::ServiceError;

fn build_service() -> (TeamService<MemoryStore>, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let service = TeamService::new(store.clone(), clock());
    (service, store)
}

/// Course 1 with students 10..=12 approved and student 13 still pending.
fn seeded() -> (TeamService<MemoryStore>, Arc<MemoryStore>) {
    let (service, store) = build_service();
    store.courses.seed([course(1), course(2)]);
    store
        .users
        .seed([student(10), student(11), student(12), student(13)]);
    store.applications.seed([
        approved(application(1, 1, 10, Some(2))),
        approved(application(2, 1, 11, Some(2))),
        approved(application(3, 1, 12, Some(2))),
        application(4, 1, 13, Some(2)),
    ]);
    (service, store)
}

#[tokio::test]
async fn create_team_validates_name_size_and_course() {
    let (service, store) = seeded();
    store.teams.seed([team(1, 1, "Đội Xanh", 5)]);

    let created = service
        .create_team(NewTeam {
            course_id: CourseId(1),
            name: " Đội Đỏ ".to_string(),
            max_members: 5,
        })
        .await
        .expect("team created");
    assert_eq!(created.name, "Đội Đỏ");
    assert!(created.member_ids.is_empty());

    let cases = [
        (CourseId(9), "Đội Vàng", 5, messages::COURSE_NOT_FOUND),
        (CourseId(1), "  ", 5, messages::TEAM_NAME_REQUIRED),
        (CourseId(1), "Đội Tím", 0, messages::TEAM_SIZE_OUT_OF_RANGE),
        (CourseId(1), "Đội Tím", 51, messages::TEAM_SIZE_OUT_OF_RANGE),
        (CourseId(1), "đội xanh", 5, messages::TEAM_NAME_TAKEN),
    ];
    for (course_id, name, max_members, expected) in cases {
        let err = service
            .create_team(NewTeam {
                course_id,
                name: name.to_string(),
                max_members,
            })
            .await
            .unwrap_err();
        assert_eq!(err.rejection(), Some(expected), "{name}");
    }

    let other_course = service
        .create_team(NewTeam {
            course_id: CourseId(2),
            name: "Đội Xanh".to_string(),
            max_members: 5,
        })
        .await;
    assert!(other_course.is_ok());
}

#[tokio::test]
async fn members_must_be_approved_and_unplaced() {
    let (service, store) = seeded();
    store
        .teams
        .seed([team(1, 1, "Đội Xanh", 2), team(2, 1, "Đội Đỏ", 2)]);

    let team = service.add_member(TeamId(1), UserId(10)).await.unwrap();
    assert_eq!(team.member_ids, vec![UserId(10)]);

    let err = service.add_member(TeamId(2), UserId(10)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::ALREADY_IN_TEAM));

    let err = service.add_member(TeamId(1), UserId(13)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::NOT_APPROVED_FOR_COURSE));

    let err = service.add_member(TeamId(1), UserId(99)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::USER_NOT_FOUND));

    service.add_member(TeamId(1), UserId(11)).await.unwrap();
    let err = service.add_member(TeamId(1), UserId(12)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::TEAM_FULL));
}

#[tokio::test]
async fn removing_the_leader_clears_leadership() {
    let (service, store) = seeded();
    store.teams.seed([team(1, 1, "Đội Xanh", 5)]);
    service.add_member(TeamId(1), UserId(10)).await.unwrap();
    service.add_member(TeamId(1), UserId(11)).await.unwrap();

    let err = service.set_leader(TeamId(1), UserId(12)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::NOT_A_TEAM_MEMBER));

    let led = service.set_leader(TeamId(1), UserId(10)).await.unwrap();
    assert_eq!(led.leader_id, Some(UserId(10)));

    let team = service.remove_member(TeamId(1), UserId(10)).await.unwrap();
    assert_eq!(team.leader_id, None);
    assert_eq!(team.member_ids, vec![UserId(11)]);
    assert_eq!(store.teams.get(TeamId(1)).unwrap(), team);
}

#[tokio::test]
async fn shrinking_below_the_roster_is_rejected() {
    let (service, store) = seeded();
    store.teams.seed([team(1, 1, "Đội Xanh", 5)]);
    service.add_member(TeamId(1), UserId(10)).await.unwrap();
    service.add_member(TeamId(1), UserId(11)).await.unwrap();

    let shrink = TeamPatch {
        max_members: Some(1),
        ..TeamPatch::default()
    };
    let err = service.update_team(TeamId(1), shrink).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::TEAM_SIZE_BELOW_MEMBERS));

    let rename = TeamPatch {
        name: Some("Đội Xanh Lá".to_string()),
        max_members: Some(2),
    };
    let team = service.update_team(TeamId(1), rename).await.unwrap();
    assert_eq!(team.name, "Đội Xanh Lá");
    assert_eq!(team.max_members, 2);
}

#[tokio::test]
async fn list_and_delete_teams() {
    let (service, store) = seeded();
    store.teams.seed([
        team(1, 1, "Đội C", 5),
        team(2, 1, "Đội A", 5),
        team(3, 2, "Đội B", 5),
    ]);

    let names: Vec<String> = service
        .list_teams(CourseId(1))
        .await
        .unwrap()
        .into_iter()
        .map(|team| team.name)
        .collect();
    assert_eq!(names, vec!["Đội A".to_string(), "Đội C".to_string()]);

    service.delete_team(TeamId(2)).await.unwrap();
    let err = service.get_team(TeamId(2)).await.unwrap_err();
    assert_eq!(err.rejection(), Some(messages::TEAM_NOT_FOUND));
}

#[tokio::test]
async fn offline_store_errors_are_not_rejections() {
    let service = TeamService::new(Arc::new(OfflineStore), clock());
    match service.get_team(TeamId(1)).await {
        Err(ServiceError::Repository(RepositoryError::Unavailable(reason))) => {
            assert_eq!(reason, "database offline");
        }
        other => panic!("expected repository failure, got {other:?}"),
    }
}
