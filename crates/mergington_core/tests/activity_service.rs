use mergington_core::db::open_db_in_memory;
use mergington_core::{
    Activity, ActivityRepository, ActivityService, ActivityServiceError, ConfirmationKind,
    InMemoryActivityRepository, SqliteActivityRepository,
};

fn chess_club() -> Activity {
    Activity::new(
        "Chess Club",
        "Learn strategies and compete in chess tournaments",
        "Fridays, 3:30 PM - 5:00 PM",
        12,
    )
    .with_participants(["alice@x.edu"])
}

fn sqlite_service(activities: &[Activity]) -> ActivityService<SqliteActivityRepository> {
    let repo = SqliteActivityRepository::new(open_db_in_memory().unwrap());
    for activity in activities {
        assert!(repo.provision_activity(activity).unwrap());
    }
    ActivityService::new(repo)
}

fn memory_service(activities: &[Activity]) -> ActivityService<InMemoryActivityRepository> {
    ActivityService::new(InMemoryActivityRepository::with_activities(activities.to_vec()).unwrap())
}

fn participants<R: ActivityRepository>(service: &ActivityService<R>, name: &str) -> Vec<String> {
    service.get_activity(name).unwrap().unwrap().participants
}

fn run_chess_club_scenario<R: ActivityRepository>(service: ActivityService<R>) {
    let confirmation = service.signup("Chess Club", "bob@x.edu").unwrap();
    assert_eq!(confirmation.kind, ConfirmationKind::SignedUp);
    assert_eq!(confirmation.message(), "Signed up bob@x.edu for Chess Club");
    assert_eq!(
        participants(&service, "Chess Club"),
        vec!["alice@x.edu", "bob@x.edu"]
    );

    let err = service.signup("Chess Club", "alice@x.edu").unwrap_err();
    assert!(matches!(
        err,
        ActivityServiceError::DuplicateParticipant { ref activity, ref email }
            if activity == "Chess Club" && email == "alice@x.edu"
    ));

    let confirmation = service.withdraw("Chess Club", "alice@x.edu").unwrap();
    assert_eq!(confirmation.kind, ConfirmationKind::Removed);
    assert_eq!(confirmation.message(), "Removed alice@x.edu from Chess Club");
    assert_eq!(participants(&service, "Chess Club"), vec!["bob@x.edu"]);

    let err = service.withdraw("Chess Club", "carol@x.edu").unwrap_err();
    assert!(matches!(
        err,
        ActivityServiceError::ParticipantNotFound { ref email, .. } if email == "carol@x.edu"
    ));

    let err = service.signup("Nonexistent Club", "x@x.edu").unwrap_err();
    assert!(matches!(
        err,
        ActivityServiceError::ActivityNotFound { ref activity } if activity == "Nonexistent Club"
    ));
}

fn run_capacity_boundary<R: ActivityRepository>(service: ActivityService<R>) {
    service.signup("Tiny Club", "a@x.edu").unwrap();
    service.signup("Tiny Club", "b@x.edu").unwrap();

    let err = service.signup("Tiny Club", "c@x.edu").unwrap_err();
    assert!(matches!(
        err,
        ActivityServiceError::ActivityFull {
            max_participants: 2,
            ..
        }
    ));
    assert_eq!(participants(&service, "Tiny Club"), vec!["a@x.edu", "b@x.edu"]);
}

fn run_round_trip<R: ActivityRepository>(service: ActivityService<R>) {
    let before = service.list_activities().unwrap();

    service.withdraw("Chess Club", "alice@x.edu").unwrap();
    service.signup("Chess Club", "alice@x.edu").unwrap();

    assert_eq!(service.list_activities().unwrap(), before);
}

fn run_listing<R: ActivityRepository>(service: ActivityService<R>) {
    let listing = service.list_activities().unwrap();

    let names: Vec<&str> = listing.keys().map(String::as_str).collect();
    assert_eq!(names, vec!["Chess Club", "Tiny Club"]);

    let chess = &listing["Chess Club"];
    assert_eq!(chess.max_participants, 12);
    assert_eq!(chess.schedule, "Fridays, 3:30 PM - 5:00 PM");
    assert_eq!(chess.participants, vec!["alice@x.edu"]);
    assert!(listing["Tiny Club"].participants.is_empty());
}

fn tiny_club() -> Activity {
    Activity::new("Tiny Club", "Two seats only", "Mondays", 2)
}

#[test]
fn chess_club_scenario_on_sqlite() {
    run_chess_club_scenario(sqlite_service(&[chess_club()]));
}

#[test]
fn chess_club_scenario_in_memory() {
    run_chess_club_scenario(memory_service(&[chess_club()]));
}

#[test]
fn capacity_boundary_on_sqlite() {
    run_capacity_boundary(sqlite_service(&[tiny_club()]));
}

#[test]
fn capacity_boundary_in_memory() {
    run_capacity_boundary(memory_service(&[tiny_club()]));
}

#[test]
fn withdraw_then_signup_restores_membership_on_sqlite() {
    run_round_trip(sqlite_service(&[chess_club()]));
}

#[test]
fn withdraw_then_signup_restores_membership_in_memory() {
    run_round_trip(memory_service(&[chess_club()]));
}

#[test]
fn listing_is_keyed_by_name_on_sqlite() {
    run_listing(sqlite_service(&[tiny_club(), chess_club()]));
}

#[test]
fn listing_is_keyed_by_name_in_memory() {
    run_listing(memory_service(&[tiny_club(), chess_club()]));
}

#[test]
fn repeated_signup_records_one_participant() {
    let service = sqlite_service(&[tiny_club()]);

    service.signup("Tiny Club", "a@x.edu").unwrap();
    let err = service.signup("Tiny Club", "a@x.edu").unwrap_err();

    assert!(matches!(err, ActivityServiceError::DuplicateParticipant { .. }));
    assert_eq!(participants(&service, "Tiny Club"), vec!["a@x.edu"]);
}

#[test]
fn roster_keeps_signup_order_after_removing_the_middle_entry() {
    let service = sqlite_service(&[Activity::new("Math Club", "Puzzles", "Tuesdays", 5)]);

    for email in ["a@x.edu", "b@x.edu", "c@x.edu"] {
        service.signup("Math Club", email).unwrap();
    }
    service.withdraw("Math Club", "b@x.edu").unwrap();
    service.signup("Math Club", "d@x.edu").unwrap();
    service.signup("Math Club", "b@x.edu").unwrap();

    assert_eq!(
        participants(&service, "Math Club"),
        vec!["a@x.edu", "c@x.edu", "d@x.edu", "b@x.edu"]
    );
}

#[test]
fn withdraw_from_missing_activity_is_not_found() {
    let service = memory_service(&[]);

    let err = service.withdraw("Ghost Club", "a@x.edu").unwrap_err();
    assert!(matches!(err, ActivityServiceError::ActivityNotFound { .. }));
    assert!(err.is_domain());
}

#[test]
fn get_activity_returns_none_for_unknown_name() {
    let service = sqlite_service(&[chess_club()]);
    assert!(service.get_activity("Ghost Club").unwrap().is_none());
}
