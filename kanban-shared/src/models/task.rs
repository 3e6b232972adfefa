/// Task model and payloads
///
/// Tasks are the cards on the board. Each one belongs to a sector, is assigned
/// to a user by id and carries a priority and a workflow status.
///
/// # Workflow
///
/// ```text
/// A Fazer ⇄ Fazendo ⇄ Pronto
/// ```
///
/// Status is a closed enumeration with no transition guards: any status may
/// be replaced by any other. New tasks always start in `A Fazer`.
///
/// # Stored Form
///
/// ```json
/// {
///   "id": 1,
///   "descricao": "Revisar relatório",
///   "setor": "TI",
///   "usuario": 1,
///   "prioridade": "Alta",
///   "status": "A Fazer"
/// }
/// ```

use crate::store::Record;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// Error returned when parsing an enumeration from an unknown label
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} `{value}`")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

/// Task priority
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Prioridade {
    Alta,
    Media,
    Baixa,
}

impl Prioridade {
    pub const ALL: [Prioridade; 3] = [Prioridade::Alta, Prioridade::Media, Prioridade::Baixa];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prioridade::Alta => "Alta",
            Prioridade::Media => "Media",
            Prioridade::Baixa => "Baixa",
        }
    }
}

impl fmt::Display for Prioridade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prioridade {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Prioridade::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "prioridade",
                value: s.to_string(),
            })
    }
}

/// Workflow stage of a task
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Status {
    /// To do
    #[default]
    #[serde(rename = "A Fazer")]
    AFazer,

    /// Doing
    Fazendo,

    /// Done
    Pronto,
}

impl Status {
    /// All statuses in board column order
    pub const ALL: [Status; 3] = [Status::AFazer, Status::Fazendo, Status::Pronto];

    /// Label shown on the board, identical to the wire value
    pub fn label(&self) -> &'static str {
        match self {
            Status::AFazer => "A Fazer",
            Status::Fazendo => "Fazendo",
            Status::Pronto => "Pronto",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Status {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Status::ALL
            .into_iter()
            .find(|st| st.label() == s)
            .ok_or_else(|| UnknownVariant {
                kind: "status",
                value: s.to_string(),
            })
    }
}

/// Task record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    /// Server-assigned id
    pub id: i64,

    /// What needs to be done
    pub descricao: String,

    /// Sector responsible for the task
    pub setor: String,

    /// Id of the assigned user
    ///
    /// Checked against the user collection when the task is created or
    /// reassigned. Deleting the user later leaves the reference dangling.
    pub usuario: i64,

    pub prioridade: Prioridade,

    pub status: Status,
}

/// Input for creating a task
///
/// There is no `status` field: unknown fields are rejected and new tasks
/// always start in [`Status::AFazer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
pub struct CreateTask {
    #[validate(custom(function = "crate::rules::validate_descricao"))]
    pub descricao: String,

    #[validate(custom(function = "crate::rules::validate_setor"))]
    pub setor: String,

    #[validate(range(min = 1, message = "Usuário inválido"))]
    pub usuario: i64,

    pub prioridade: Prioridade,
}

/// Partial update of a task
///
/// Every provided field overwrites the stored value verbatim. Only types and
/// enumerations are checked, by deserialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub descricao: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub setor: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usuario: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prioridade: Option<Prioridade>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl TaskPatch {
    /// Patch that only moves the task to another column
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.descricao.is_none()
            && self.setor.is_none()
            && self.usuario.is_none()
            && self.prioridade.is_none()
            && self.status.is_none()
    }

    /// Overwrites the provided fields of `task`
    pub fn apply(self, task: &mut Task) {
        if let Some(descricao) = self.descricao {
            task.descricao = descricao;
        }
        if let Some(setor) = self.setor {
            task.setor = setor;
        }
        if let Some(usuario) = self.usuario {
            task.usuario = usuario;
        }
        if let Some(prioridade) = self.prioridade {
            task.prioridade = prioridade;
        }
        if let Some(status) = self.status {
            task.status = status;
        }
    }
}

impl Record for Task {
    type Draft = CreateTask;

    const COLLECTION: &'static str = "tasks";

    fn id(&self) -> i64 {
        self.id
    }

    fn from_draft(id: i64, draft: CreateTask) -> Self {
        Task {
            id,
            descricao: draft.descricao,
            setor: draft.setor,
            usuario: draft.usuario,
            prioridade: draft.prioridade,
            status: Status::AFazer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Task {
        Task {
            id: 7,
            descricao: "Revisar relatório".to_string(),
            setor: "TI".to_string(),
            usuario: 1,
            prioridade: Prioridade::Alta,
            status: Status::AFazer,
        }
    }

    #[test]
    fn test_status_wire_labels() {
        assert_eq!(serde_json::to_value(Status::AFazer).unwrap(), json!("A Fazer"));
        assert_eq!(
            serde_json::from_value::<Status>(json!("Pronto")).unwrap(),
            Status::Pronto
        );
        assert!(serde_json::from_value::<Status>(json!("AFazer")).is_err());
        assert_eq!("Fazendo".parse::<Status>().unwrap(), Status::Fazendo);
    }

    #[test]
    fn test_prioridade_rejects_unknown() {
        let err = "Urgente".parse::<Prioridade>().unwrap_err();
        assert_eq!(err.to_string(), "unknown prioridade `Urgente`");
        assert!(serde_json::from_value::<Prioridade>(json!("Média")).is_err());
    }

    #[test]
    fn test_from_draft_forces_initial_status() {
        let task = Task::from_draft(
            3,
            CreateTask {
                descricao: "Configurar backup".to_string(),
                setor: "Infra".to_string(),
                usuario: 2,
                prioridade: Prioridade::Baixa,
            },
        );
        assert_eq!(task.id, 3);
        assert_eq!(task.status, Status::AFazer);
    }

    #[test]
    fn test_create_task_rejects_status_field() {
        let body = json!({
            "descricao": "Revisar relatório",
            "setor": "TI",
            "usuario": 1,
            "prioridade": "Alta",
            "status": "Pronto"
        });
        let err = serde_json::from_value::<CreateTask>(body).unwrap_err();
        assert!(err.to_string().contains("unknown field `status`"));
    }

    #[test]
    fn test_create_task_validation() {
        let draft = CreateTask {
            descricao: "abc".to_string(),
            setor: "Recursos Humanos".to_string(),
            usuario: 0,
            prioridade: Prioridade::Media,
        };
        let errors = crate::rules::FieldErrors::from(draft.validate().unwrap_err());
        assert!(errors.contains("descricao"));
        assert!(errors.contains("setor"));
        assert_eq!(errors.first("usuario"), Some("Usuário inválido"));
    }

    #[test]
    fn test_patch_overwrites_only_given_fields() {
        let mut task = sample();
        let patch: TaskPatch = serde_json::from_value(json!({
            "status": "Fazendo",
            "setor": "RH"
        }))
        .unwrap();
        patch.apply(&mut task);

        assert_eq!(task.status, Status::Fazendo);
        assert_eq!(task.setor, "RH");
        assert_eq!(task.descricao, "Revisar relatório");
        assert_eq!(task.id, 7);
    }

    #[test]
    fn test_patch_rejects_id_and_unknown_fields() {
        assert!(serde_json::from_value::<TaskPatch>(json!({"id": 9})).is_err());
        assert!(serde_json::from_value::<TaskPatch>(json!({"usuarioId": 9})).is_err());
    }

    #[test]
    fn test_status_patch_serializes_single_field() {
        let body = serde_json::to_value(TaskPatch::status(Status::Pronto)).unwrap();
        assert_eq!(body, json!({"status": "Pronto"}));
        assert!(TaskPatch::default().is_empty());
    }
}
