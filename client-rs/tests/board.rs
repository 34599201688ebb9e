use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use pretty_assertions::assert_eq;

use team_core::ops;
use teams_client::{
    Ack, ApprovalControl, ApprovalField, ApprovalStatus, BulkDeleted, ClientError, ClientResult,
    Created, Member, NewTeam, NotificationKind, RecordingNotifier, Team, TeamBoard, TeamPatch,
    TeamsApi,
};

/// In-process stand-in for the server. Applies changes to its own list so
/// re-fetches see them, and can be told to fail or to hold responses.
#[derive(Default)]
struct FakeApi {
    teams: Mutex<Vec<Team>>,
    fail: AtomicBool,
    calls: AtomicUsize,
    reorders: Mutex<Vec<Vec<String>>>,
    hold: tokio::sync::Mutex<()>,
}

impl FakeApi {
    fn with_teams(teams: Vec<Team>) -> Self {
        Self {
            teams: Mutex::new(teams),
            ..Self::default()
        }
    }

    fn fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn begin(&self) -> ClientResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        drop(self.hold.lock().await);
        if self.fail.load(Ordering::SeqCst) {
            Err(ClientError::Api {
                status: 500,
                message: "Internal server error".into(),
            })
        } else {
            Ok(())
        }
    }

    fn apply(&self, f: impl FnOnce(&[Team]) -> Vec<Team>) {
        let mut teams = self.teams.lock().unwrap();
        *teams = f(&teams);
    }

    fn ok() -> Ack {
        Ack {
            success: true,
            ..Ack::default()
        }
    }
}

#[async_trait]
impl TeamsApi for FakeApi {
    async fn list(&self, _search: Option<&str>) -> ClientResult<Vec<Team>> {
        self.begin().await?;
        let mut teams = self.teams.lock().unwrap().clone();
        teams.sort_by_key(|t| t.order);
        Ok(teams)
    }

    async fn get(&self, id: &str) -> ClientResult<Team> {
        self.begin().await?;
        self.teams
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or(ClientError::Api {
                status: 404,
                message: "Team not found".into(),
            })
    }

    async fn create(&self, team: &NewTeam) -> ClientResult<Created> {
        self.begin().await?;
        let mut teams = self.teams.lock().unwrap();
        let id = format!("t{}", teams.len() + 1);
        let order = ops::next_order(&teams);
        teams.push(team.clone().into_team(id.clone(), order, Utc::now()));
        Ok(Created {
            success: true,
            id,
            message: None,
            error: None,
        })
    }

    async fn update(&self, id: &str, patch: &TeamPatch) -> ClientResult<Ack> {
        self.begin().await?;
        let mut teams = self.teams.lock().unwrap();
        if let Some(team) = teams.iter_mut().find(|t| t.id == id) {
            patch.clone().apply(team, Utc::now());
        }
        Ok(Self::ok())
    }

    async fn delete(&self, id: &str) -> ClientResult<Ack> {
        self.begin().await?;
        self.apply(|teams| ops::without_team(teams, id));
        Ok(Self::ok())
    }

    async fn bulk_delete(&self, ids: &[String]) -> ClientResult<BulkDeleted> {
        self.begin().await?;
        let before = self.teams.lock().unwrap().len();
        self.apply(|teams| ops::without_teams(teams, ids));
        let after = self.teams.lock().unwrap().len();
        Ok(BulkDeleted {
            success: true,
            deleted_count: (before - after) as u64,
            message: None,
            error: None,
        })
    }

    async fn update_status(
        &self,
        id: &str,
        field: ApprovalField,
        status: ApprovalStatus,
    ) -> ClientResult<Ack> {
        self.begin().await?;
        self.apply(|teams| ops::with_status(teams, id, field, status));
        Ok(Self::ok())
    }

    async fn delete_member(&self, team_id: &str, member_id: &str) -> ClientResult<Ack> {
        self.begin().await?;
        if !self.teams.lock().unwrap().iter().any(|t| t.id == team_id) {
            return Err(ClientError::Api {
                status: 404,
                message: "Team not found".into(),
            });
        }
        self.apply(|teams| ops::without_member(teams, team_id, member_id));
        Ok(Self::ok())
    }

    async fn update_member(&self, team_id: &str, member_id: &str, name: &str) -> ClientResult<Ack> {
        self.begin().await?;
        self.apply(|teams| ops::with_member_name(teams, team_id, member_id, name));
        Ok(Self::ok())
    }

    async fn reorder(&self, teams: &[Team]) -> ClientResult<Ack> {
        self.begin().await?;
        self.reorders
            .lock()
            .unwrap()
            .push(teams.iter().map(|t| t.id.clone()).collect());
        self.apply(|current| ops::with_order(current, teams));
        Ok(Self::ok())
    }
}

fn team(id: &str, name: &str, order: i64, members: &[&str]) -> Team {
    NewTeam {
        team_name: name.into(),
        manager: format!("{name} Manager"),
        director: format!("{name} Director"),
        members: members.iter().map(|m| Member::new(*m)).collect(),
    }
    .into_team(id.into(), order, Utc::now())
}

fn ids(teams: &[Team]) -> Vec<&str> {
    teams.iter().map(|t| t.id.as_str()).collect()
}

async fn board_with(teams: Vec<Team>) -> (Arc<TeamBoard<FakeApi>>, RecordingNotifier) {
    let notifier = RecordingNotifier::new();
    let board = Arc::new(TeamBoard::new(
        FakeApi::with_teams(teams),
        Arc::new(notifier.clone()),
    ));
    board.fetch().await.unwrap();
    (board, notifier)
}

#[tokio::test]
async fn fetch_failure_keeps_list_and_notifies() {
    let (board, notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann"])]).await;
    board.api().fail(true);

    assert!(board.fetch().await.is_err());
    assert_eq!(ids(&board.teams().await), vec!["a"]);
    let last = notifier.last().unwrap();
    assert_eq!(last.kind, NotificationKind::Failure);
    assert_eq!(last.title, "Error Loading Teams");
}

#[tokio::test]
async fn failed_delete_restores_the_exact_list() {
    let (board, notifier) = board_with(vec![
        team("a", "Alpha", 0, &["Ann"]),
        team("b", "Beta", 1, &["Bob"]),
    ])
    .await;
    let before = serde_json::to_vec(&board.teams().await).unwrap();
    board.api().fail(true);

    let err = board.delete_team("a").await.unwrap_err();
    assert_eq!(err.status(), Some(500));
    assert_eq!(serde_json::to_vec(&board.teams().await).unwrap(), before);

    let last = notifier.last().unwrap();
    assert_eq!(last.title, "Error Deleting Team");
    assert_eq!(last.description, "Failed to delete \"Alpha\". Please try again.");
}

#[tokio::test]
async fn delete_shows_before_the_server_answers() {
    let (board, notifier) = board_with(vec![
        team("a", "Alpha", 0, &["Ann"]),
        team("b", "Beta", 1, &["Bob"]),
    ])
    .await;

    let hold = board.api().hold.lock().await;
    let task = {
        let board = Arc::clone(&board);
        tokio::spawn(async move { board.delete_team("a").await })
    };
    while board.teams().await.len() != 1 {
        tokio::task::yield_now().await;
    }
    assert_eq!(ids(&board.teams().await), vec!["b"]);
    drop(hold);

    task.await.unwrap().unwrap();
    assert_eq!(ids(&board.teams().await), vec!["b"]);
    let last = notifier.last().unwrap();
    assert_eq!(last.title, "Team Deleted Successfully");
    assert_eq!(last.description, "\"Alpha\" has been removed from the system.");
}

#[tokio::test]
async fn status_change_names_the_approver() {
    let (board, notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann"])]).await;

    board
        .update_status("a", ApprovalField::DirectorApprovalStatus, ApprovalStatus::Approved)
        .await
        .unwrap();
    assert_eq!(
        notifier.last().unwrap().description,
        "Team \"Alpha\" got Director Approval"
    );

    board
        .update_status("a", ApprovalField::ManagerApprovalStatus, ApprovalStatus::NotApproved)
        .await
        .unwrap();
    assert_eq!(
        notifier.last().unwrap().description,
        "Team \"Alpha\" was Not Approved by Manager"
    );

    let stored = &board.teams().await[0];
    assert_eq!(stored.director_approval_status, ApprovalStatus::Approved);
    assert_eq!(stored.manager_approval_status, ApprovalStatus::NotApproved);
}

#[tokio::test]
async fn last_member_is_refused_without_a_request() {
    let (board, notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann"])]).await;
    let member_id = board.teams().await[0].members[0].id.clone();
    let calls = board.api().calls();

    let err = board.delete_member("a", &member_id).await.unwrap_err();
    assert!(matches!(err, ClientError::LastMember));
    assert_eq!(board.api().calls(), calls);
    assert_eq!(board.teams().await[0].members.len(), 1);
    assert_eq!(notifier.last().unwrap().title, "Cannot Delete Last Member");
}

#[tokio::test]
async fn member_delete_and_failed_rename() {
    let (board, notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann", "Al"])]).await;
    let members = board.teams().await[0].members.clone();

    board.delete_member("a", &members[1].id).await.unwrap();
    assert_eq!(
        notifier.last().unwrap().description,
        "\"Al\" has been removed from \"Alpha\"."
    );

    board.api().fail(true);
    assert!(board.update_member("a", &members[0].id, "Annie").await.is_err());
    assert_eq!(board.teams().await[0].members[0].name, "Ann");
    assert_eq!(notifier.last().unwrap().title, "Error Updating Member");
}

#[tokio::test]
async fn drag_reorder_end_to_end() {
    let (board, notifier) = board_with(vec![
        team("a", "Alpha", 0, &["Ann"]),
        team("b", "Beta", 1, &["Bob"]),
    ])
    .await;

    board.drag_start(1).await;
    board.drag_over(0).await;
    assert_eq!(board.dragged_index().await, Some(0));
    assert_eq!(ids(&board.visible().await), vec!["b", "a"]);

    board.drag_end().await.unwrap();
    assert_eq!(board.dragged_index().await, None);
    assert_eq!(
        board.api().reorders.lock().unwrap().clone(),
        vec![vec!["b".to_string(), "a".to_string()]]
    );

    let teams = board.teams().await;
    assert_eq!(ids(&teams), vec!["b", "a"]);
    assert_eq!(teams.iter().map(|t| t.order).collect::<Vec<_>>(), vec![0, 1]);
    assert_eq!(notifier.last().unwrap().title, "Teams Reordered Successfully");
}

#[tokio::test]
async fn failed_drag_restores_the_previous_order() {
    let (board, notifier) = board_with(vec![
        team("a", "Alpha", 0, &["Ann"]),
        team("b", "Beta", 1, &["Bob"]),
        team("c", "Gamma", 2, &["Cid"]),
    ])
    .await;
    board.api().fail(true);

    board.drag_start(0).await;
    board.drag_over(1).await;
    board.drag_over(2).await;
    assert_eq!(ids(&board.visible().await), vec!["b", "c", "a"]);

    assert!(board.drag_end().await.is_err());
    assert_eq!(ids(&board.visible().await), vec!["a", "b", "c"]);
    assert_eq!(notifier.last().unwrap().title, "Error Reordering Teams");
}

#[tokio::test]
async fn approval_click_cycles_and_reverts_one_step() {
    let (board, _notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann"])]).await;
    let control = ApprovalControl::new(&board.teams().await[0], ApprovalField::ManagerApprovalStatus);
    assert_eq!(control.shown().await, ApprovalStatus::Pending);

    assert_eq!(control.click(&board).await.unwrap(), ApprovalStatus::Approved);
    assert_eq!(control.click(&board).await.unwrap(), ApprovalStatus::NotApproved);
    assert_eq!(control.tooltip().await, "Not Approved");

    board.api().fail(true);
    assert!(control.click(&board).await.is_err());
    assert_eq!(control.shown().await, ApprovalStatus::NotApproved);
    assert_eq!(
        board.teams().await[0].manager_approval_status,
        ApprovalStatus::NotApproved
    );
}

#[tokio::test]
async fn invalid_draft_is_rejected_locally() {
    let (board, notifier) = board_with(vec![]).await;
    let calls = board.api().calls();

    let draft = NewTeam {
        team_name: "Gamma".into(),
        manager: " ".into(),
        director: "Dee".into(),
        members: vec![],
    };
    match board.create_team(draft).await {
        Err(ClientError::Invalid(errors)) => {
            assert_eq!(errors.get("manager"), Some("Manager is required"));
            assert_eq!(errors.get("members"), Some("At least one member is required"));
        }
        other => panic!("expected validation error, got {other:?}"),
    }
    assert_eq!(board.api().calls(), calls);
    assert_eq!(notifier.last().unwrap().title, "Validation Error");
}

#[tokio::test]
async fn create_then_save_updates_the_list() {
    let (board, notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann"])]).await;

    let draft = NewTeam {
        team_name: "Gamma".into(),
        manager: "Gil".into(),
        director: "Dee".into(),
        members: vec![Member::new("Gus"), Member::new("Gia")],
    };
    let id = board.create_team(draft.clone()).await.unwrap();
    assert_eq!(
        notifier.last().unwrap().description,
        "\"Gamma\" has been created with 2 member(s)."
    );
    let created = board.load_team(&id).await.unwrap();
    assert_eq!(created.order, 1);
    assert_eq!(created.manager_approval_status, ApprovalStatus::Pending);

    let edited = NewTeam {
        team_name: "Gamma Prime".into(),
        ..draft
    };
    board.save_team(&id, edited).await.unwrap();
    let teams = board.teams().await;
    assert_eq!(teams[1].team_name, "Gamma Prime");
    assert_eq!(notifier.last().unwrap().title, "Team Updated Successfully");
}

#[tokio::test]
async fn delete_selected_clears_selection_even_on_failure() {
    let (board, notifier) = board_with(vec![
        team("a", "Alpha", 0, &["Ann"]),
        team("b", "Beta", 1, &["Bob"]),
        team("c", "Gamma", 2, &["Cid"]),
    ])
    .await;

    board.set_selected("a", true).await;
    board.toggle_selected("c").await;
    assert_eq!(board.delete_selected().await.unwrap(), 2);
    assert!(board.selection().await.is_empty());
    assert_eq!(ids(&board.teams().await), vec!["b"]);
    assert_eq!(
        notifier.last().unwrap().description,
        "2 team(s) removed: Alpha, Gamma"
    );

    board.api().fail(true);
    board.select_all_visible().await;
    assert!(board.delete_selected().await.is_err());
    assert!(board.selection().await.is_empty());
    assert_eq!(ids(&board.teams().await), vec!["b"]);
}

#[tokio::test]
async fn search_filters_the_visible_rows() {
    let (board, _notifier) = board_with(vec![
        team("a", "Alpha", 0, &["Eve"]),
        team("b", "Beta", 1, &["Bob"]),
    ])
    .await;

    board.set_query("EVE").await;
    assert_eq!(ids(&board.visible().await), vec!["a"]);
    board.set_query("   ").await;
    assert_eq!(ids(&board.visible().await), vec!["a", "b"]);
}

#[tokio::test]
async fn member_delete_for_unknown_team_goes_to_the_server() {
    let (board, notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann"])]).await;
    let calls = board.api().calls();

    let err = board.delete_member("zz", "m1").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
    assert_eq!(board.api().calls(), calls + 1);
    assert_eq!(notifier.last().unwrap().title, "Error Removing Member");
}

#[tokio::test]
async fn saved_members_share_ids_with_the_server() {
    let (board, _notifier) = board_with(vec![team("a", "Alpha", 0, &["Ann"])]).await;

    let mut draft = NewTeam::from(&board.teams().await[0]);
    draft.members.push(Member {
        id: String::new(),
        name: "Neo".into(),
    });
    board.save_team("a", draft).await.unwrap();

    let local = board.teams().await[0].members[1].id.clone();
    let server = board.api().teams.lock().unwrap()[0].members[1].id.clone();
    assert!(!local.is_empty());
    assert_eq!(local, server);

    board.delete_member("a", &local).await.unwrap();
    assert_eq!(board.api().teams.lock().unwrap()[0].members.len(), 1);
    assert_eq!(board.teams().await[0].members.len(), 1);
}

#[tokio::test]
async fn created_members_share_ids_with_the_server() {
    let (board, _notifier) = board_with(vec![]).await;

    let draft = NewTeam {
        team_name: "Gamma".into(),
        manager: "Gil".into(),
        director: "Dee".into(),
        members: vec![Member {
            id: String::new(),
            name: "Gus".into(),
        }],
    };
    let id = board.create_team(draft).await.unwrap();

    let created = board.load_team(&id).await.unwrap();
    assert!(!created.members[0].id.is_empty());
    assert_eq!(board.teams().await[0].members, created.members);
}
