/// Field validation rules
///
/// This module is the single source of truth for the per-field rules applied
/// to user input. The server wires them into request payloads through
/// `#[validate(custom(...))]`; the client forms call the same functions on raw
/// form input before submitting.
///
/// Each rule is a predicate chain over one field: checks run in order and the
/// first failing check determines the message. Rules are independent of each
/// other; a form is valid only when every field passes.
///
/// # Rules
///
/// | Field | Rule |
/// |---|---|
/// | `descricao` | 5-200 characters, not only whitespace |
/// | `setor` | 2-100 characters, not only whitespace, no whitespace at all |
/// | `usuario` | positive integer |
/// | `nome` | 3-50 characters, letters separated by single spaces |
/// | `email` | 5-100 characters, email-shaped |
///
/// The task edit form relaxes `descricao` (no whitespace check) and tightens
/// `setor` to 50 characters. Select inputs (`usuario`, `prioridade`, `status`)
/// have `parse_*` helpers returning the typed value.
///
/// # Example
///
/// ```
/// use kanban_shared::rules::{validate_nome, validate_setor};
///
/// assert!(validate_nome("Ana Silva").is_ok());
/// assert!(validate_nome("Ana  Silva").is_err());
/// assert!(validate_setor("Financeiro").is_ok());
/// assert!(validate_setor("Recursos Humanos").is_err());
/// ```

use crate::models::task::{Prioridade, Status};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;
use std::fmt;
use validator::{ValidateEmail, ValidationError, ValidationErrors};

pub const DESCRICAO_MIN: usize = 5;
pub const DESCRICAO_MAX: usize = 200;
pub const SETOR_MIN: usize = 2;
pub const SETOR_MAX: usize = 100;
pub const SETOR_EDIT_MAX: usize = 50;
pub const NOME_MIN: usize = 3;
pub const NOME_MAX: usize = 50;
pub const EMAIL_MIN: usize = 5;
pub const EMAIL_MAX: usize = 100;

/// Field-keyed validation messages
///
/// Serialized as a plain JSON object, `{"field": ["message", ...]}`. Fields
/// are kept sorted so responses are stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an error map holding a single message
    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_default().push(message.into());
    }

    /// Records the outcome of a rule for `field`, if it failed
    pub fn check(&mut self, field: &str, outcome: Result<(), ValidationError>) {
        if let Err(err) = outcome {
            self.add(field, message_of(&err));
        }
    }

    /// Records the failure of a parsing rule, returning the parsed value
    pub fn parsed<T>(&mut self, field: &str, outcome: Result<T, ValidationError>) -> Option<T> {
        match outcome {
            Ok(value) => Some(value),
            Err(err) => {
                self.add(field, message_of(&err));
                None
            }
        }
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    pub fn get(&self, field: &str) -> Option<&[String]> {
        self.0.get(field).map(Vec::as_slice)
    }

    /// First message for `field`, the one a form displays inline
    pub fn first(&self, field: &str) -> Option<&str> {
        self.0.get(field).and_then(|m| m.first()).map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// `Ok(())` when no field failed
    pub fn into_result(self) -> Result<(), FieldErrors> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, messages) in &self.0 {
            for message in messages {
                if !first {
                    write!(f, "; ")?;
                }
                write!(f, "{}: {}", field, message)?;
                first = false;
            }
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

impl From<ValidationErrors> for FieldErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut out = FieldErrors::new();
        for (field, errs) in errors.field_errors() {
            for err in errs.iter() {
                out.add(field.to_string(), message_of(err));
            }
        }
        out
    }
}

fn message_of(err: &ValidationError) -> String {
    err.message
        .as_ref()
        .map(|m| m.to_string())
        .unwrap_or_else(|| err.code.to_string())
}

fn fail(code: &'static str, message: &'static str) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(Cow::Borrowed(message));
    err
}

fn char_len(value: &str) -> usize {
    value.chars().count()
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Task description on creation
pub fn validate_descricao(value: &str) -> Result<(), ValidationError> {
    validate_descricao_edit(value)?;
    if is_blank(value) {
        return Err(fail("blank", "A descrição não pode conter apenas espaços"));
    }
    Ok(())
}

/// Task description in the edit form
pub fn validate_descricao_edit(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if len < DESCRICAO_MIN {
        return Err(fail("length", "A descrição deve conter no mínimo 5 caracteres"));
    }
    if len > DESCRICAO_MAX {
        return Err(fail("length", "A descrição deve conter no máximo 200 caracteres"));
    }
    Ok(())
}

/// Task sector on creation: a single word
pub fn validate_setor(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if len < SETOR_MIN {
        return Err(fail("length", "O setor deve conter ao menos 2 caracteres"));
    }
    if len > SETOR_MAX {
        return Err(fail("length", "O setor deve conter no máximo 100 caracteres"));
    }
    if is_blank(value) {
        return Err(fail("blank", "O setor não pode conter apenas espaços"));
    }
    if value.chars().any(char::is_whitespace) {
        return Err(fail("whitespace", "O setor não pode conter espaços"));
    }
    Ok(())
}

/// Task sector in the edit form
pub fn validate_setor_edit(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if len < SETOR_MIN {
        return Err(fail("length", "O setor deve conter ao menos 2 caracteres"));
    }
    if len > SETOR_EDIT_MAX {
        return Err(fail("length", "O setor deve conter no máximo 50 caracteres"));
    }
    Ok(())
}

/// Assigned user id
pub fn validate_usuario(value: i64) -> Result<(), ValidationError> {
    if value <= 0 {
        return Err(fail("range", "Usuário inválido"));
    }
    Ok(())
}

/// Assigned user as typed into a form: non-empty, numeric and positive
///
/// Returns the parsed id.
pub fn parse_usuario(raw: &str) -> Result<i64, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(fail("required", "Escolha um usuário"));
    }
    let id = raw
        .parse::<i64>()
        .map_err(|_| fail("number", "Usuário inválido"))?;
    validate_usuario(id)?;
    Ok(id)
}

/// Assigned user as chosen in the edit form
pub fn parse_usuario_edit(raw: &str) -> Result<i64, ValidationError> {
    match raw.trim().parse::<i64>() {
        Ok(id) if id >= 1 => Ok(id),
        _ => Err(fail("range", "Escolha um usuário válido")),
    }
}

/// Priority as chosen in the creation form
pub fn parse_prioridade(raw: &str) -> Result<Prioridade, ValidationError> {
    raw.parse()
        .map_err(|_| fail("enum", "A prioridade deve ser Alta, Média ou Baixa"))
}

/// Priority as chosen in the edit form
pub fn parse_prioridade_edit(raw: &str) -> Result<Prioridade, ValidationError> {
    raw.parse()
        .map_err(|_| fail("enum", "A prioridade deve ser Alta, Media ou Baixa"))
}

/// Optional status from the edit form; blank means "keep the current one"
pub fn parse_status(raw: &str) -> Result<Option<Status>, ValidationError> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| fail("enum", "Status inválido"))
}

fn is_name_letter(c: char) -> bool {
    c.is_ascii_alphabetic() || ('\u{C0}'..='\u{FF}').contains(&c)
}

/// Person name: letters (including Latin-1 accents) separated by single spaces
pub fn validate_nome(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if len < NOME_MIN {
        return Err(fail("length", "Mínimo de 3 caracteres"));
    }
    if len > NOME_MAX {
        return Err(fail("length", "Máximo de 50 caracteres"));
    }
    if value.trim() != value {
        return Err(fail("trim", "Não pode começar ou terminar com espaço"));
    }
    if value.contains("  ") {
        return Err(fail("spaces", "Não pode conter múltiplos espaços consecutivos"));
    }
    if !value.split(' ').all(|word| word.chars().all(is_name_letter)) {
        return Err(fail(
            "letters",
            "Digite apenas letras e espaços simples entre nomes",
        ));
    }
    Ok(())
}

/// Email address
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    let len = char_len(value);
    if len < EMAIL_MIN {
        return Err(fail("length", "Email muito curto"));
    }
    if len > EMAIL_MAX {
        return Err(fail("length", "Email muito longo"));
    }
    if !value.validate_email() {
        return Err(fail("email", "Email inválido"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn message(result: Result<(), ValidationError>) -> String {
        message_of(&result.unwrap_err())
    }

    #[test]
    fn test_descricao_bounds() {
        assert!(validate_descricao("abcde").is_ok());
        assert!(validate_descricao(&"a".repeat(200)).is_ok());
        assert_eq!(
            message(validate_descricao("abcd")),
            "A descrição deve conter no mínimo 5 caracteres"
        );
        assert_eq!(
            message(validate_descricao(&"a".repeat(201))),
            "A descrição deve conter no máximo 200 caracteres"
        );
    }

    #[test]
    fn test_descricao_counts_characters_not_bytes() {
        // 5 characters, 10 bytes
        assert!(validate_descricao("çãõéí").is_ok());
    }

    #[test]
    fn test_descricao_rejects_whitespace_only() {
        assert_eq!(
            message(validate_descricao("      ")),
            "A descrição não pode conter apenas espaços"
        );
        // the edit form only checks length
        assert!(validate_descricao_edit("      ").is_ok());
    }

    #[test]
    fn test_setor_rules() {
        assert!(validate_setor("TI").is_ok());
        assert_eq!(
            message(validate_setor("T")),
            "O setor deve conter ao menos 2 caracteres"
        );
        assert_eq!(
            message(validate_setor("   ")),
            "O setor não pode conter apenas espaços"
        );
        assert_eq!(
            message(validate_setor("Recursos Humanos")),
            "O setor não pode conter espaços"
        );
        assert!(validate_setor(&"x".repeat(100)).is_ok());
        assert!(validate_setor(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_setor_edit_limit() {
        assert!(validate_setor_edit(&"x".repeat(50)).is_ok());
        assert_eq!(
            message(validate_setor_edit(&"x".repeat(51))),
            "O setor deve conter no máximo 50 caracteres"
        );
        assert!(validate_setor_edit("Recursos Humanos").is_ok());
    }

    #[test]
    fn test_parse_usuario() {
        assert_eq!(parse_usuario("3").unwrap(), 3);
        assert_eq!(message(parse_usuario("").map(|_| ())), "Escolha um usuário");
        assert_eq!(message(parse_usuario("abc").map(|_| ())), "Usuário inválido");
        assert_eq!(message(parse_usuario("0").map(|_| ())), "Usuário inválido");
        assert_eq!(message(parse_usuario("-2").map(|_| ())), "Usuário inválido");
    }

    #[test]
    fn test_edit_form_selects() {
        assert_eq!(parse_usuario_edit(" 4 ").unwrap(), 4);
        assert_eq!(
            message(parse_usuario_edit("").map(|_| ())),
            "Escolha um usuário válido"
        );
        assert_eq!(parse_prioridade_edit("Baixa").unwrap(), Prioridade::Baixa);
        assert_eq!(
            message(parse_prioridade("Urgente").map(|_| ())),
            "A prioridade deve ser Alta, Média ou Baixa"
        );
        assert_eq!(parse_status("").unwrap(), None);
        assert_eq!(parse_status("A Fazer").unwrap(), Some(Status::AFazer));
        assert_eq!(message(parse_status("Feito").map(|_| ())), "Status inválido");
    }

    #[test]
    fn test_nome_rules() {
        assert!(validate_nome("Ana").is_ok());
        assert!(validate_nome("João da Conceição").is_ok());
        assert_eq!(message(validate_nome("Al")), "Mínimo de 3 caracteres");
        assert_eq!(message(validate_nome(&"a".repeat(51))), "Máximo de 50 caracteres");
        assert_eq!(
            message(validate_nome(" Ana")),
            "Não pode começar ou terminar com espaço"
        );
        assert_eq!(
            message(validate_nome("Ana  Silva")),
            "Não pode conter múltiplos espaços consecutivos"
        );
        assert_eq!(
            message(validate_nome("Ana2")),
            "Digite apenas letras e espaços simples entre nomes"
        );
        assert!(validate_nome("Ana\tSilva").is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("ana@x.com").is_ok());
        assert_eq!(message(validate_email("a@b")), "Email muito curto");
        assert_eq!(message(validate_email("not-an-email")), "Email inválido");
        let long = format!("{}@example.com", "a".repeat(95));
        assert_eq!(message(validate_email(&long)), "Email muito longo");
    }

    #[test]
    fn test_field_errors_collects_and_serializes() {
        let mut errors = FieldErrors::new();
        errors.check("setor", validate_setor("x"));
        errors.check("descricao", validate_descricao("valid description"));
        errors.add("setor", "second");

        assert_eq!(errors.len(), 1);
        assert_eq!(
            errors.first("setor"),
            Some("O setor deve conter ao menos 2 caracteres")
        );
        assert!(!errors.contains("descricao"));

        let json = serde_json::to_value(&errors).unwrap();
        assert_eq!(json["setor"][1], "second");
    }

    #[test]
    fn test_field_errors_into_result() {
        assert!(FieldErrors::new().into_result().is_ok());
        assert!(FieldErrors::single("email", "Email inválido").into_result().is_err());
    }
}
