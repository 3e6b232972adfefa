/// Domain models for the Kanban board
///
/// Both entity types are flat records with a server-assigned integer id.
///
/// # Models
///
/// - `user`: People that tasks are assigned to
/// - `task`: Work items moving through the `A Fazer` → `Fazendo` → `Pronto` workflow
///
/// # Example
///
/// ```
/// use kanban_shared::models::task::{CreateTask, Prioridade, Status, Task};
/// use kanban_shared::store::Record;
///
/// let draft = CreateTask {
///     descricao: "Revisar relatório".to_string(),
///     setor: "TI".to_string(),
///     usuario: 1,
///     prioridade: Prioridade::Alta,
/// };
///
/// let task = Task::from_draft(1, draft);
/// assert_eq!(task.status, Status::AFazer);
/// ```

pub mod task;
pub mod user;
