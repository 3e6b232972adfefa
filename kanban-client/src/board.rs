/// Management board
///
/// The board shows every task in one of three columns by status and offers
/// the per-card actions: move (status dropdown or drag-and-drop), edit and
/// delete.
///
/// # Layout
///
/// ```text
/// A Fazer (1)        Fazendo (0)                Pronto (0)
/// ┌──────────────┐   Nenhuma tarefa fazendo     Nenhuma tarefa pronto
/// │ descricao    │
/// │ setor        │
/// │ prioridade   │
/// │ owner name   │
/// └──────────────┘
/// ```
///
/// # Status Changes
///
/// Both the dropdown and drag-and-drop end up in [`Board::change_status`],
/// which skips the request when the task is already in the target column
/// and otherwise sends a patch carrying only `status`.
///
/// # Reloads
///
/// Edits and deletes reload the task list once the server has accepted them.
/// The returned notice always reflects the write itself; a failed reload is
/// kept aside for [`Board::take_reload_error`] and the board keeps the local
/// copy of the change.
///
/// # Example
///
/// ```
/// use kanban_client::board::Board;
/// use kanban_client::mock::MockApi;
/// use kanban_shared::models::task::Status;
///
/// # async fn example() -> Result<(), kanban_client::api::ClientError> {
/// let api = MockApi::new();
/// let mut board = Board::load(&api).await?;
///
/// for column in board.columns() {
///     println!("{}", column.heading());
/// }
///
/// if let Some(notice) = board.drop_on_column(&api, "1", Status::Fazendo).await {
///     println!("{}", notice);
/// }
/// # Ok(())
/// # }
/// ```

use crate::api::{ClientResult, KanbanApi};
use crate::forms::{EditTask, FormError};
use crate::notice::Notice;
use kanban_shared::models::{
    task::{Status, Task, TaskPatch},
    user::User,
};
use std::collections::HashMap;

pub const TASK_UPDATED: &str = "Tarefa atualizada com sucesso!";
pub const TASK_UPDATE_FAILED: &str = "Erro ao atualizar tarefa";
pub const TASK_DELETED: &str = "Tarefa deletada com sucesso!";
pub const TASK_DELETE_FAILED: &str = "Erro ao deletar tarefa";
pub const TASKS_LOAD_FAILED: &str = "Não foi possível carregar as tarefas";
pub const DELETE_PROMPT: &str = "Tem certeza?";

/// Shown on a card whose `usuario` matches no known user
pub const UNKNOWN_OWNER: &str = "Usuário não encontrado";

/// One status column
#[derive(Debug)]
pub struct Column<'a> {
    pub status: Status,
    pub tasks: Vec<&'a Task>,
}

impl Column<'_> {
    /// Column title with its card count, e.g. `Fazendo (2)`
    pub fn heading(&self) -> String {
        format!("{} ({})", self.status.label(), self.tasks.len())
    }

    /// Placeholder shown when the column has no cards
    pub fn empty_text(&self) -> String {
        format!("Nenhuma tarefa {}", self.status.label().to_lowercase())
    }
}

/// Board state: the fetched tasks and users plus pending dropdown choices
#[derive(Debug, Default)]
pub struct Board {
    tasks: Vec<Task>,
    users: Vec<User>,
    selected: HashMap<i64, Status>,
    reload_error: Option<Notice>,
}

impl Board {
    pub fn new(tasks: Vec<Task>, users: Vec<User>) -> Self {
        Board {
            tasks,
            users,
            selected: HashMap::new(),
            reload_error: None,
        }
    }

    /// Fetches tasks and users
    pub async fn load(api: &dyn KanbanApi) -> ClientResult<Self> {
        let tasks = api.list_tasks().await?;
        let users = api.list_users().await?;
        tracing::debug!(tasks = tasks.len(), users = users.len(), "board loaded");
        Ok(Board::new(tasks, users))
    }

    /// Re-fetches the task list, keeping the current one on failure
    pub async fn refresh(&mut self, api: &dyn KanbanApi) -> Option<Notice> {
        match api.list_tasks().await {
            Ok(tasks) => {
                self.tasks = tasks;
                self.selected.retain(|id, _| self.tasks.iter().any(|t| t.id == *id));
                None
            }
            Err(err) => Some(Notice::failed(TASKS_LOAD_FAILED, &err)),
        }
    }

    /// Failure of the reload that followed the last successful edit or delete
    pub fn take_reload_error(&mut self) -> Option<Notice> {
        self.reload_error.take()
    }

    async fn reload_after_write(&mut self, api: &dyn KanbanApi) {
        self.reload_error = self.refresh(api).await;
        if self.reload_error.is_some() {
            tracing::warn!("board shows local changes only until the next reload");
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn task(&self, id: i64) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Tasks grouped by status, columns in workflow order
    pub fn columns(&self) -> Vec<Column<'_>> {
        Status::ALL
            .into_iter()
            .map(|status| Column {
                status,
                tasks: self.tasks.iter().filter(|t| t.status == status).collect(),
            })
            .collect()
    }

    /// Name of the task's assigned user
    pub fn owner_name(&self, task: &Task) -> &str {
        self.users
            .iter()
            .find(|u| u.id == task.usuario)
            .map(|u| u.nome.as_str())
            .unwrap_or(UNKNOWN_OWNER)
    }

    /// Records a dropdown choice without sending anything
    pub fn select_status(&mut self, task_id: i64, status: Status) {
        self.selected.insert(task_id, status);
    }

    /// Status shown in the card's dropdown
    pub fn selected_status(&self, task_id: i64) -> Option<Status> {
        self.selected
            .get(&task_id)
            .copied()
            .or_else(|| self.task(task_id).map(|t| t.status))
    }

    /// Applies the dropdown choice of a card
    pub async fn confirm_status(&mut self, api: &dyn KanbanApi, task_id: i64) -> Option<Notice> {
        let status = self.selected_status(task_id)?;
        let notice = self.change_status(api, task_id, status).await;
        if notice.as_ref().map_or(true, Notice::is_success) {
            self.selected.remove(&task_id);
        }
        notice
    }

    /// Handles a card dropped on a column
    ///
    /// `payload` is the drag data, the task id as decimal text. Unreadable
    /// payloads are ignored.
    pub async fn drop_on_column(
        &mut self,
        api: &dyn KanbanApi,
        payload: &str,
        column: Status,
    ) -> Option<Notice> {
        let Ok(task_id) = payload.trim().parse::<i64>() else {
            tracing::debug!(payload, "ignoring drop with unreadable payload");
            return None;
        };
        self.change_status(api, task_id, column).await
    }

    /// Moves a task to another column
    ///
    /// Returns `None` without sending a request when the task already has
    /// `status`. Unknown ids are still sent; the server answers 404.
    pub async fn change_status(
        &mut self,
        api: &dyn KanbanApi,
        task_id: i64,
        status: Status,
    ) -> Option<Notice> {
        if self.task(task_id).is_some_and(|t| t.status == status) {
            return None;
        }

        match api.patch_task(task_id, &TaskPatch::status(status)).await {
            Ok(updated) => {
                tracing::info!(task_id, status = %updated.status, "task moved");
                self.apply(updated);
                Some(Notice::success(TASK_UPDATED))
            }
            Err(err) => Some(Notice::failed(TASK_UPDATE_FAILED, &err)),
        }
    }

    /// Edit form for a card, pre-filled
    pub fn open_edit(&self, task_id: i64) -> Option<EditTask> {
        self.task(task_id).map(EditTask::from_task)
    }

    /// Validates the edit form, saves every editable field and reloads the tasks
    pub async fn submit_edit(
        &mut self,
        api: &dyn KanbanApi,
        task_id: i64,
        form: &EditTask,
    ) -> Result<Notice, FormError> {
        let current = self.task(task_id).map(|t| t.status).unwrap_or_default();
        let patch = form.validate(current).map_err(FormError::Invalid)?;

        let updated = api
            .patch_task(task_id, &patch)
            .await
            .map_err(|source| FormError::Rejected {
                notice: Notice::failed(TASK_UPDATE_FAILED, &source),
                source,
            })?;
        tracing::info!(task_id, "task edited");

        self.apply(updated);
        self.reload_after_write(api).await;
        Ok(Notice::success(TASK_UPDATED))
    }

    /// Starts deleting a card; nothing is sent until confirmed
    pub fn request_delete(&self, task_id: i64) -> Option<PendingDelete> {
        self.task(task_id).map(|task| PendingDelete {
            task_id,
            descricao: task.descricao.clone(),
        })
    }

    fn apply(&mut self, task: Task) {
        match self.tasks.iter_mut().find(|t| t.id == task.id) {
            Some(slot) => *slot = task,
            None => self.tasks.push(task),
        }
    }
}

/// Delete awaiting confirmation
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use = "a pending delete does nothing until confirmed"]
pub struct PendingDelete {
    pub task_id: i64,
    pub descricao: String,
}

impl PendingDelete {
    /// Confirmation question
    pub fn prompt(&self) -> String {
        format!("{} A tarefa \"{}\" será excluída.", DELETE_PROMPT, self.descricao)
    }

    /// Deletes the task and reloads the board
    pub async fn confirm(self, api: &dyn KanbanApi, board: &mut Board) -> Notice {
        if let Err(err) = api.delete_task(self.task_id).await {
            return Notice::failed(TASK_DELETE_FAILED, &err);
        }
        tracing::info!(task_id = self.task_id, "task deleted");

        board.tasks.retain(|t| t.id != self.task_id);
        board.selected.remove(&self.task_id);
        board.reload_after_write(api).await;
        Notice::success(TASK_DELETED)
    }

    /// Drops the delete without sending anything
    pub fn cancel(self) {
        tracing::debug!(task_id = self.task_id, "delete cancelled");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockApi;
    use kanban_shared::models::task::Prioridade;

    fn task(id: i64, usuario: i64, status: Status) -> Task {
        Task {
            id,
            descricao: format!("Tarefa {}", id),
            setor: "TI".to_string(),
            usuario,
            prioridade: Prioridade::Alta,
            status,
        }
    }

    fn ana() -> User {
        User {
            id: 1,
            nome: "Ana Silva".to_string(),
            email: "ana@x.com".to_string(),
        }
    }

    async fn loaded(tasks: Vec<Task>) -> (MockApi, Board) {
        let api = MockApi::with_records(tasks, vec![ana()]);
        let board = Board::load(&api).await.unwrap();
        api.clear_requests();
        (api, board)
    }

    #[test]
    fn test_columns_in_workflow_order() {
        let board = Board::new(
            vec![
                task(1, 1, Status::Pronto),
                task(2, 1, Status::AFazer),
                task(3, 1, Status::Pronto),
            ],
            vec![ana()],
        );

        let columns = board.columns();
        assert_eq!(
            columns.iter().map(|c| c.status).collect::<Vec<_>>(),
            Status::ALL.to_vec()
        );
        assert_eq!(columns[0].heading(), "A Fazer (1)");
        assert_eq!(columns[1].tasks.len(), 0);
        assert_eq!(columns[1].empty_text(), "Nenhuma tarefa fazendo");
        assert_eq!(
            columns[2].tasks.iter().map(|t| t.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
    }

    #[test]
    fn test_owner_name_falls_back() {
        let board = Board::new(vec![task(1, 1, Status::AFazer), task(2, 9, Status::AFazer)], vec![ana()]);

        assert_eq!(board.owner_name(&board.tasks()[0]), "Ana Silva");
        assert_eq!(board.owner_name(&board.tasks()[1]), UNKNOWN_OWNER);
    }

    #[tokio::test]
    async fn test_drop_sends_status_only_patch() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::AFazer)]).await;

        let notice = board.drop_on_column(&api, " 1\n", Status::Fazendo).await.unwrap();

        assert_eq!(notice, Notice::success(TASK_UPDATED));
        assert_eq!(api.requests(), vec!["PATCH /tasks/1"]);
        assert_eq!(board.task(1).unwrap().status, Status::Fazendo);
        assert_eq!(board.task(1).unwrap().descricao, "Tarefa 1");
    }

    #[tokio::test]
    async fn test_drop_on_same_column_is_a_no_op() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::Fazendo)]).await;

        assert!(board.drop_on_column(&api, "1", Status::Fazendo).await.is_none());
        assert!(board.drop_on_column(&api, "card-1", Status::Pronto).await.is_none());
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_dropdown_selection_then_confirm() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::AFazer)]).await;

        board.select_status(1, Status::Pronto);
        assert_eq!(board.selected_status(1), Some(Status::Pronto));
        assert!(api.requests().is_empty());

        let notice = board.confirm_status(&api, 1).await.unwrap();
        assert!(notice.is_success());
        assert_eq!(board.task(1).unwrap().status, Status::Pronto);

        // nothing selected: confirming resends the current status, which is skipped
        assert!(board.confirm_status(&api, 1).await.is_none());
        assert_eq!(api.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_move_keeps_local_state() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::AFazer)]).await;
        api.reject_writes(true);

        let notice = board.change_status(&api, 1, Status::Pronto).await.unwrap();

        assert_eq!(notice.title, TASK_UPDATE_FAILED);
        assert_eq!(board.task(1).unwrap().status, Status::AFazer);
        // one attempt, no retry
        assert_eq!(api.requests(), vec!["PATCH /tasks/1"]);
    }

    #[tokio::test]
    async fn test_edit_saves_all_fields() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::Fazendo)]).await;

        let mut form = board.open_edit(1).unwrap();
        form.descricao = "Revisar relatório final".to_string();
        form.status.clear();

        let notice = board.submit_edit(&api, 1, &form).await.unwrap();

        assert_eq!(notice.title, TASK_UPDATED);
        assert_eq!(api.requests(), vec!["PATCH /tasks/1", "GET /tasks"]);
        let saved = board.task(1).unwrap();
        assert_eq!(saved.descricao, "Revisar relatório final");
        assert_eq!(saved.status, Status::Fazendo);
    }

    #[tokio::test]
    async fn test_edit_succeeds_when_reload_fails() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::AFazer)]).await;
        api.reject_reads(true);

        let mut form = board.open_edit(1).unwrap();
        form.setor = "Financeiro".to_string();
        let notice = board.submit_edit(&api, 1, &form).await.unwrap();

        assert_eq!(notice, Notice::success(TASK_UPDATED));
        assert_eq!(board.task(1).unwrap().setor, "Financeiro");
        let reload = board.take_reload_error().unwrap();
        assert_eq!(reload.title, TASKS_LOAD_FAILED);
        assert!(board.take_reload_error().is_none());
    }

    #[tokio::test]
    async fn test_invalid_edit_sends_nothing() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::AFazer)]).await;

        let mut form = board.open_edit(1).unwrap();
        form.descricao = "abc".to_string();

        let err = board.submit_edit(&api, 1, &form).await.unwrap_err();
        assert!(err.field_errors().unwrap().contains("descricao"));
        assert!(api.requests().is_empty());
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::AFazer), task(2, 1, Status::AFazer)]).await;

        let pending = board.request_delete(1).unwrap();
        assert!(pending.prompt().starts_with(DELETE_PROMPT));
        pending.cancel();
        assert!(api.requests().is_empty());
        assert_eq!(board.tasks().len(), 2);

        let notice = board.request_delete(1).unwrap().confirm(&api, &mut board).await;
        assert_eq!(notice, Notice::success(TASK_DELETED));
        assert_eq!(api.requests(), vec!["DELETE /tasks/1", "GET /tasks"]);
        assert_eq!(board.tasks().iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
    }

    #[tokio::test]
    async fn test_delete_succeeds_when_reload_fails() {
        let (api, mut board) = loaded(vec![task(1, 1, Status::AFazer), task(2, 1, Status::Pronto)]).await;
        api.reject_reads(true);

        let notice = board.request_delete(1).unwrap().confirm(&api, &mut board).await;

        assert_eq!(notice, Notice::success(TASK_DELETED));
        assert_eq!(api.requests(), vec!["DELETE /tasks/1", "GET /tasks"]);
        assert_eq!(board.tasks().iter().map(|t| t.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(board.take_reload_error().unwrap().title, TASKS_LOAD_FAILED);
    }

    #[test]
    fn test_request_delete_unknown_task() {
        let board = Board::new(Vec::new(), Vec::new());
        assert!(board.request_delete(5).is_none());
        assert!(board.open_edit(5).is_none());
    }
}
