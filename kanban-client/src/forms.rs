/// Input forms
///
/// Forms hold raw text exactly as typed or selected, validate it with the
/// shared rules from [`kanban_shared::rules`] on submit, and only then talk
/// to the server.
///
/// # Flow
///
/// ```text
/// submit()
///   ├─> validate every field       -> FormError::Invalid (no request sent)
///   ├─> send one request           -> FormError::Rejected (error notice)
///   └─> success                    -> (record, success notice)
/// ```
///
/// # Example
///
/// ```
/// use kanban_client::forms::TaskForm;
///
/// let form = TaskForm {
///     descricao: "Revisar relatório".to_string(),
///     setor: "Recursos Humanos".to_string(),
///     usuario: String::new(),
///     prioridade: "Alta".to_string(),
/// };
///
/// let errors = form.validate().unwrap_err();
/// assert_eq!(errors.first("setor"), Some("O setor não pode conter espaços"));
/// assert_eq!(errors.first("usuario"), Some("Escolha um usuário"));
/// ```

use crate::api::{ClientError, KanbanApi};
use crate::notice::Notice;
use kanban_shared::{
    models::{
        task::{CreateTask, Status, Task, TaskPatch},
        user::{CreateUser, User},
    },
    rules::{self, FieldErrors},
};

pub const TASK_CREATED: &str = "Tarefa criada com sucesso!";
pub const TASK_CREATE_FAILED: &str = "Erro ao criar tarefa";
pub const USER_CREATED: &str = "Cadastro concluído com sucesso!";
pub const USER_CREATE_FAILED: &str = "Ocorreu um erro ao cadastrar o usuário.";

/// Placeholder entry of the user selector
pub const USER_PLACEHOLDER: &str = "Selecione um Usuário";

/// Form submission error types
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Input failed validation; nothing was sent
    #[error("{0}")]
    Invalid(FieldErrors),

    /// The server refused or could not be reached
    #[error("{notice}")]
    Rejected {
        notice: Notice,
        #[source]
        source: ClientError,
    },
}

impl FormError {
    fn rejected(title: &str, source: ClientError) -> Self {
        FormError::Rejected {
            notice: Notice::failed(title, &source),
            source,
        }
    }

    /// Messages to show next to the inputs
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            FormError::Invalid(errors) => Some(errors),
            FormError::Rejected { .. } => None,
        }
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            FormError::Invalid(_) => None,
            FormError::Rejected { notice, .. } => Some(notice),
        }
    }
}

/// One entry of a `<select>`-like input: submitted value and label
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
}

/// Task creation form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskForm {
    pub descricao: String,
    pub setor: String,
    /// Selected user id, empty when nothing is selected
    pub usuario: String,
    pub prioridade: String,
}

impl TaskForm {
    /// Choices for the `usuario` selector, placeholder first
    pub fn user_options(users: &[User]) -> Vec<SelectOption> {
        let placeholder = SelectOption {
            value: String::new(),
            label: USER_PLACEHOLDER.to_string(),
        };
        std::iter::once(placeholder)
            .chain(users.iter().map(|u| SelectOption {
                value: u.id.to_string(),
                label: u.nome.clone(),
            }))
            .collect()
    }

    /// Checks every field, returning the request payload
    pub fn validate(&self) -> Result<CreateTask, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check("descricao", rules::validate_descricao(&self.descricao));
        errors.check("setor", rules::validate_setor(&self.setor));

        let usuario = errors.parsed("usuario", rules::parse_usuario(&self.usuario));
        let prioridade = errors.parsed("prioridade", rules::parse_prioridade(&self.prioridade));

        match (usuario, prioridade) {
            (Some(usuario), Some(prioridade)) if errors.is_empty() => Ok(CreateTask {
                descricao: self.descricao.clone(),
                setor: self.setor.clone(),
                usuario,
                prioridade,
            }),
            _ => Err(errors),
        }
    }

    /// Validates and creates the task
    ///
    /// On success the form is cleared.
    pub async fn submit(&mut self, api: &dyn KanbanApi) -> Result<(Task, Notice), FormError> {
        let draft = self.validate().map_err(FormError::Invalid)?;

        let task = api
            .create_task(&draft)
            .await
            .map_err(|e| FormError::rejected(TASK_CREATE_FAILED, e))?;
        tracing::info!(task_id = task.id, "task created");

        *self = TaskForm::default();
        Ok((task, Notice::success(TASK_CREATED)))
    }
}

/// User registration form
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserForm {
    pub nome: String,
    pub email: String,
}

impl UserForm {
    pub fn validate(&self) -> Result<CreateUser, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check("nome", rules::validate_nome(&self.nome));
        errors.check("email", rules::validate_email(&self.email));
        errors.into_result()?;

        Ok(CreateUser {
            nome: self.nome.clone(),
            email: self.email.clone(),
        })
    }

    /// Validates and registers the user
    ///
    /// A server rejection (e.g. duplicate email) surfaces as the notice
    /// detail. On success the form is cleared.
    pub async fn submit(&mut self, api: &dyn KanbanApi) -> Result<(User, Notice), FormError> {
        let draft = self.validate().map_err(FormError::Invalid)?;

        let user = api
            .create_user(&draft)
            .await
            .map_err(|e| FormError::rejected(USER_CREATE_FAILED, e))?;
        tracing::info!(user_id = user.id, "user registered");

        *self = UserForm::default();
        Ok((user, Notice::success(USER_CREATED)))
    }
}

/// Task edit form, opened from a card
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditTask {
    pub descricao: String,
    pub setor: String,
    pub prioridade: String,
    pub usuario: String,
    /// Empty keeps the task's current status
    pub status: String,
}

impl EditTask {
    /// Form pre-filled with the task's current values
    pub fn from_task(task: &Task) -> Self {
        EditTask {
            descricao: task.descricao.clone(),
            setor: task.setor.clone(),
            prioridade: task.prioridade.to_string(),
            usuario: task.usuario.to_string(),
            status: task.status.to_string(),
        }
    }

    /// Checks every field, returning a patch of every editable field
    ///
    /// `current` fills in the status when the form leaves it empty.
    pub fn validate(&self, current: Status) -> Result<TaskPatch, FieldErrors> {
        let mut errors = FieldErrors::new();
        errors.check("descricao", rules::validate_descricao_edit(&self.descricao));
        errors.check("setor", rules::validate_setor_edit(&self.setor));

        let prioridade = errors.parsed("prioridade", rules::parse_prioridade_edit(&self.prioridade));
        let usuario = errors.parsed("usuario", rules::parse_usuario_edit(&self.usuario));
        let status = errors.parsed("status", rules::parse_status(&self.status));
        errors.into_result()?;

        Ok(TaskPatch {
            descricao: Some(self.descricao.clone()),
            setor: Some(self.setor.clone()),
            usuario,
            prioridade,
            status: Some(status.flatten().unwrap_or(current)),
        })
    }
}
