/// Board controller scenarios against the in-memory gateway
///
/// Run with: cargo test --test controller_tests

use std::sync::Arc;
use std::time::Duration;

use taskboard_shared::sync::bootstrap::DEFAULT_CATEGORIES;
use taskboard_shared::sync::memory::{InMemoryGateway, Operation};
use taskboard_shared::sync::{
    CategoryColor, Controller, ControllerConfig, Direction, LoadSource, MoveOutcome, Session,
    SyncError, PALETTE,
};
use uuid::Uuid;

fn session(user_id: Uuid) -> Session {
    Session::new(user_id, "sam@example.com", Some("Sam"))
}

fn controller(gateway: &Arc<InMemoryGateway>) -> Controller {
    Controller::new(gateway.clone(), ControllerConfig::default())
}

/// Signs in a user who already has one category, so no defaults are created
async fn signed_in_with_category(name: &str) -> (Arc<InMemoryGateway>, Controller, Uuid) {
    let gateway = Arc::new(InMemoryGateway::new());
    let user_id = Uuid::new_v4();
    let category_id = gateway
        .seed_category(user_id, name, CategoryColor::Blue)
        .await;

    let mut controller = controller(&gateway);
    assert_eq!(controller.sign_in(session(user_id)).await, LoadSource::Existing);

    (gateway, controller, category_id)
}

fn texts(controller: &Controller, category_id: Uuid) -> Vec<(String, usize)> {
    controller
        .category(category_id)
        .unwrap()
        .tasks
        .iter()
        .map(|t| (t.text.clone(), t.position))
        .collect()
}

#[tokio::test]
async fn test_fresh_user_gets_defaults() {
    let gateway = Arc::new(InMemoryGateway::new());
    let user_id = Uuid::new_v4();
    let mut controller = controller(&gateway);

    let source = controller.sign_in(session(user_id)).await;

    assert_eq!(source, LoadSource::Bootstrapped);
    assert_eq!(controller.categories().len(), 6);
    for (category, (name, color)) in controller.categories().iter().zip(DEFAULT_CATEGORIES) {
        assert_eq!(category.name, name);
        assert_eq!(category.color, color);
        assert_eq!(category.total_count(), 0);
    }
    assert_eq!(gateway.category_count(user_id).await, 6);
}

#[tokio::test]
async fn test_existing_user_is_not_bootstrapped() {
    let (gateway, controller, category_id) = signed_in_with_category("Only").await;

    assert_eq!(controller.categories().len(), 1);
    assert_eq!(controller.categories()[0].id, category_id);
    assert_eq!(gateway.call_count(Operation::CreateCategory).await, 0);
}

#[tokio::test]
async fn test_failed_load_does_not_bootstrap() {
    let gateway = Arc::new(InMemoryGateway::new());
    gateway.fail(Operation::LoadAll).await;
    let mut controller = controller(&gateway);

    let source = controller.sign_in(session(Uuid::new_v4())).await;

    assert_eq!(source, LoadSource::Unavailable);
    assert!(controller.categories().is_empty());
    assert!(controller.is_authenticated());
    assert_eq!(gateway.call_count(Operation::CreateCategory).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_slow_load_times_out() {
    let gateway = Arc::new(InMemoryGateway::new());
    let user_id = Uuid::new_v4();
    gateway
        .seed_category(user_id, "Work", CategoryColor::Blue)
        .await;
    gateway.set_load_delay(Duration::from_secs(6)).await;
    let mut controller = controller(&gateway);

    let source = controller.sign_in(session(user_id)).await;

    assert_eq!(source, LoadSource::Unavailable);
    assert!(controller.categories().is_empty());
    assert_eq!(gateway.call_count(Operation::CreateCategory).await, 0);
}

#[tokio::test(start_paused = true)]
async fn test_load_within_timeout_succeeds() {
    let gateway = Arc::new(InMemoryGateway::new());
    let user_id = Uuid::new_v4();
    gateway
        .seed_category(user_id, "Work", CategoryColor::Blue)
        .await;
    gateway.set_load_delay(Duration::from_secs(4)).await;
    let mut controller = controller(&gateway);

    assert_eq!(controller.sign_in(session(user_id)).await, LoadSource::Existing);
    assert_eq!(controller.categories().len(), 1);
}

#[tokio::test]
async fn test_task_query_failure_keeps_categories() {
    let gateway = Arc::new(InMemoryGateway::new());
    let user_id = Uuid::new_v4();
    let category_id = gateway
        .seed_category(user_id, "Work", CategoryColor::Blue)
        .await;
    gateway.seed_task(user_id, category_id, "a", 0).await.unwrap();
    gateway.fail(Operation::LoadTasks).await;
    let mut controller = controller(&gateway);

    assert_eq!(controller.sign_in(session(user_id)).await, LoadSource::Existing);
    assert_eq!(controller.category(category_id).unwrap().total_count(), 0);
}

#[tokio::test]
async fn test_add_category_uses_unused_color() {
    let gateway = Arc::new(InMemoryGateway::new());
    let mut controller = controller(&gateway);
    controller.sign_in(session(Uuid::new_v4())).await;

    let category = controller.add_category("  Side Project ").await.unwrap();

    assert_eq!(category.name, "Side Project");
    assert!(PALETTE.contains(&category.color));
    let defaults: Vec<CategoryColor> = DEFAULT_CATEGORIES.iter().map(|(_, c)| *c).collect();
    assert!(!defaults.contains(&category.color));
    assert_eq!(controller.categories().last().unwrap().id, category.id);
}

#[tokio::test]
async fn test_add_category_rejects_blank_name() {
    let (gateway, mut controller, _) = signed_in_with_category("Work").await;

    let err = controller.add_category("   ").await.unwrap_err();

    assert!(matches!(err, SyncError::Validation(_)));
    assert_eq!(gateway.call_count(Operation::CreateCategory).await, 0);
    assert_eq!(controller.categories().len(), 1);
}

#[tokio::test]
async fn test_add_category_failure_leaves_board_unchanged() {
    let (gateway, mut controller, _) = signed_in_with_category("Work").await;
    let before = controller.categories().to_vec();
    gateway.fail(Operation::CreateCategory).await;

    let err = controller.add_category("New").await.unwrap_err();

    assert!(matches!(err, SyncError::Persistence(_)));
    assert_eq!(controller.categories(), before.as_slice());
}

#[tokio::test]
async fn test_add_task_appends_at_end() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    controller.add_task(category_id, "one").await.unwrap();
    controller.add_task(category_id, "two").await.unwrap();

    let task = controller.add_task(category_id, "three").await.unwrap();

    assert_eq!(task.position, 2);
    assert!(!task.completed);
    assert_eq!(gateway.stored_task(task.id).await.unwrap().position, 2);
    assert!(controller.category(category_id).unwrap().has_contiguous_positions());
}

#[tokio::test]
async fn test_add_task_unknown_category() {
    let (gateway, mut controller, _) = signed_in_with_category("Work").await;
    let missing = Uuid::new_v4();

    let err = controller.add_task(missing, "x").await.unwrap_err();

    assert_eq!(err, SyncError::CategoryNotFound(missing));
    assert_eq!(gateway.call_count(Operation::CreateTask).await, 0);
}

#[tokio::test]
async fn test_add_task_failure_leaves_board_unchanged() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    controller.add_task(category_id, "one").await.unwrap();
    let before = controller.categories().to_vec();
    gateway.fail(Operation::CreateTask).await;

    assert!(controller.add_task(category_id, "two").await.is_err());
    assert_eq!(controller.categories(), before.as_slice());
}

#[tokio::test]
async fn test_toggle_task_round_trip() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let task = controller.add_task(category_id, "one").await.unwrap();

    assert!(controller.toggle_task(category_id, task.id).await.unwrap());
    assert!(gateway.stored_task(task.id).await.unwrap().completed);
    assert_eq!(controller.category(category_id).unwrap().completed_count(), 1);

    assert!(!controller.toggle_task(category_id, task.id).await.unwrap());
    assert!(!gateway.stored_task(task.id).await.unwrap().completed);
}

#[tokio::test]
async fn test_toggle_missing_task_makes_no_call() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let missing = Uuid::new_v4();

    let err = controller.toggle_task(category_id, missing).await.unwrap_err();

    assert_eq!(err, SyncError::TaskNotFound(missing));
    assert_eq!(gateway.call_count(Operation::UpdateTask).await, 0);
}

#[tokio::test]
async fn test_toggle_failure_keeps_flag() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let task = controller.add_task(category_id, "one").await.unwrap();
    gateway.fail(Operation::UpdateTask).await;

    assert!(controller.toggle_task(category_id, task.id).await.is_err());
    assert!(!controller.category(category_id).unwrap().tasks[0].completed);
}

#[tokio::test]
async fn test_edit_task() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let task = controller.add_task(category_id, "draft").await.unwrap();

    controller
        .edit_task(category_id, task.id, " final ")
        .await
        .unwrap();

    assert_eq!(controller.category(category_id).unwrap().tasks[0].text, "final");
    assert_eq!(gateway.stored_task(task.id).await.unwrap().text, "final");

    let err = controller.edit_task(category_id, task.id, "").await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
}

#[tokio::test]
async fn test_move_up_scenario() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    controller.add_task(category_id, "A").await.unwrap();
    controller.add_task(category_id, "B").await.unwrap();
    let c = controller.add_task(category_id, "C").await.unwrap();

    let outcome = controller
        .move_task(category_id, c.id, Direction::Up)
        .await
        .unwrap();

    assert_eq!(outcome, MoveOutcome::Moved);
    assert_eq!(
        texts(&controller, category_id),
        vec![("A".to_string(), 0), ("C".to_string(), 1), ("B".to_string(), 2)]
    );

    let stored: Vec<Uuid> = gateway
        .stored_positions(category_id)
        .await
        .into_iter()
        .map(|(id, _)| id)
        .collect();
    assert_eq!(stored, controller.category(category_id).unwrap().task_ids());
}

#[tokio::test]
async fn test_move_at_boundary_is_noop() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let first = controller.add_task(category_id, "A").await.unwrap();
    let last = controller.add_task(category_id, "B").await.unwrap();
    let before = controller.categories().to_vec();

    let up = controller
        .move_task(category_id, first.id, Direction::Up)
        .await
        .unwrap();
    let down = controller
        .move_task(category_id, last.id, Direction::Down)
        .await
        .unwrap();

    assert_eq!(up, MoveOutcome::AtBoundary);
    assert_eq!(down, MoveOutcome::AtBoundary);
    assert_eq!(controller.categories(), before.as_slice());
    assert_eq!(gateway.call_count(Operation::SetPositions).await, 0);
}

#[tokio::test]
async fn test_failed_move_marks_stale_and_reload_recovers() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let a = controller.add_task(category_id, "A").await.unwrap();
    controller.add_task(category_id, "B").await.unwrap();
    let before = controller.categories().to_vec();

    gateway.fail_after(Operation::SetPositions, 1).await;
    let err = controller
        .move_task(category_id, a.id, Direction::Down)
        .await
        .unwrap_err();

    assert!(matches!(err, SyncError::Persistence(_)));
    assert_eq!(controller.categories(), before.as_slice());
    assert!(controller.is_stale(category_id));

    gateway.recover(Operation::SetPositions).await;
    assert_eq!(controller.reload().await, LoadSource::Existing);

    assert!(!controller.is_stale(category_id));
    let reloaded = controller.category(category_id).unwrap();
    let stored: Vec<(Uuid, usize)> = gateway.stored_positions(category_id).await;
    assert_eq!(
        reloaded.tasks.iter().map(|t| (t.id, t.position)).collect::<Vec<_>>(),
        stored
    );
}

#[tokio::test]
async fn test_successful_move_clears_stale() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let a = controller.add_task(category_id, "A").await.unwrap();
    controller.add_task(category_id, "B").await.unwrap();

    gateway.fail(Operation::SetPositions).await;
    assert!(controller
        .move_task(category_id, a.id, Direction::Down)
        .await
        .is_err());
    assert_eq!(controller.stale_categories().count(), 1);

    gateway.recover(Operation::SetPositions).await;
    controller
        .move_task(category_id, a.id, Direction::Down)
        .await
        .unwrap();

    assert!(!controller.is_stale(category_id));
    assert_eq!(
        texts(&controller, category_id),
        vec![("B".to_string(), 0), ("A".to_string(), 1)]
    );
}

#[tokio::test]
async fn test_delete_task_compacts_positions() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    controller.add_task(category_id, "A").await.unwrap();
    let b = controller.add_task(category_id, "B").await.unwrap();
    let c = controller.add_task(category_id, "C").await.unwrap();

    controller.delete_task(category_id, b.id).await.unwrap();

    assert_eq!(
        texts(&controller, category_id),
        vec![("A".to_string(), 0), ("C".to_string(), 1)]
    );
    assert_eq!(gateway.stored_task(c.id).await.unwrap().position, 1);
    assert!(gateway.stored_task(b.id).await.is_none());
}

#[tokio::test]
async fn test_delete_last_task_needs_no_compaction() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    controller.add_task(category_id, "A").await.unwrap();
    let b = controller.add_task(category_id, "B").await.unwrap();

    controller.delete_task(category_id, b.id).await.unwrap();

    assert_eq!(texts(&controller, category_id), vec![("A".to_string(), 0)]);
    assert_eq!(gateway.call_count(Operation::SetPositions).await, 0);
}

#[tokio::test]
async fn test_delete_task_compaction_failure_marks_stale() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let a = controller.add_task(category_id, "A").await.unwrap();
    controller.add_task(category_id, "B").await.unwrap();
    gateway.fail(Operation::SetPositions).await;

    controller.delete_task(category_id, a.id).await.unwrap();

    assert_eq!(texts(&controller, category_id), vec![("B".to_string(), 1)]);
    assert!(controller.is_stale(category_id));
}

#[tokio::test]
async fn test_add_after_failed_compaction_closes_gap() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let a = controller.add_task(category_id, "A").await.unwrap();
    let b = controller.add_task(category_id, "B").await.unwrap();
    gateway.fail(Operation::SetPositions).await;
    controller.delete_task(category_id, a.id).await.unwrap();

    gateway.recover(Operation::SetPositions).await;
    let c = controller.add_task(category_id, "C").await.unwrap();

    assert_eq!(c.position, 1);
    assert_eq!(
        texts(&controller, category_id),
        vec![("B".to_string(), 0), ("C".to_string(), 1)]
    );
    assert!(controller.category(category_id).unwrap().has_contiguous_positions());
    assert!(!controller.is_stale(category_id));
    assert_eq!(
        gateway.stored_positions(category_id).await,
        vec![(b.id, 0), (c.id, 1)]
    );
}

#[tokio::test]
async fn test_add_is_refused_while_gap_cannot_be_closed() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let a = controller.add_task(category_id, "A").await.unwrap();
    controller.add_task(category_id, "B").await.unwrap();
    gateway.fail(Operation::SetPositions).await;
    controller.delete_task(category_id, a.id).await.unwrap();

    let err = controller.add_task(category_id, "C").await.unwrap_err();

    assert!(matches!(err, SyncError::Persistence(_)));
    assert_eq!(texts(&controller, category_id), vec![("B".to_string(), 1)]);
    assert_eq!(gateway.task_count(category_id).await, 1);
    assert_eq!(gateway.call_count(Operation::CreateTask).await, 2);
}

#[tokio::test]
async fn test_delete_task_failure_keeps_task() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let a = controller.add_task(category_id, "A").await.unwrap();
    gateway.fail(Operation::DeleteTask).await;

    assert!(controller.delete_task(category_id, a.id).await.is_err());
    assert_eq!(controller.category(category_id).unwrap().total_count(), 1);
}

#[tokio::test]
async fn test_delete_category_removes_tasks_after_confirm() {
    let (gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    controller.add_task(category_id, "A").await.unwrap();

    gateway.fail(Operation::DeleteCategory).await;
    assert!(controller.delete_category(category_id).await.is_err());
    assert!(controller.category(category_id).is_some());

    gateway.recover(Operation::DeleteCategory).await;
    controller.delete_category(category_id).await.unwrap();

    assert!(controller.category(category_id).is_none());
    assert_eq!(gateway.task_count(category_id).await, 0);
}

#[tokio::test]
async fn test_delete_unknown_category_makes_no_call() {
    let (gateway, mut controller, _) = signed_in_with_category("Work").await;
    let missing = Uuid::new_v4();

    let err = controller.delete_category(missing).await.unwrap_err();

    assert_eq!(err, SyncError::CategoryNotFound(missing));
    assert_eq!(gateway.call_count(Operation::DeleteCategory).await, 0);
}

#[tokio::test]
async fn test_sign_out_clears_everything() {
    let (_gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    controller.add_task(category_id, "A").await.unwrap();

    controller.sign_out();

    assert!(!controller.is_authenticated());
    assert!(controller.categories().is_empty());
    assert_eq!(
        controller.add_category("x").await.unwrap_err(),
        SyncError::Unauthenticated
    );
}

#[tokio::test]
async fn test_positions_stay_contiguous_through_mixed_operations() {
    let (_gateway, mut controller, category_id) = signed_in_with_category("Work").await;
    let mut ids = Vec::new();
    for text in ["a", "b", "c", "d", "e"] {
        ids.push(controller.add_task(category_id, text).await.unwrap().id);
    }

    controller
        .move_task(category_id, ids[4], Direction::Up)
        .await
        .unwrap();
    controller.delete_task(category_id, ids[1]).await.unwrap();
    controller
        .move_task(category_id, ids[0], Direction::Down)
        .await
        .unwrap();
    controller.add_task(category_id, "f").await.unwrap();
    controller.delete_task(category_id, ids[0]).await.unwrap();

    let category = controller.category(category_id).unwrap();
    assert!(category.has_contiguous_positions());
    assert_eq!(category.total_count(), 4);
}
