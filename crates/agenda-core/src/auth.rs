//! Login and registration form checks, run before any network call

pub const USER_MIN: usize = 3;
pub const USER_MAX: usize = 20;
pub const PASSWORD_MIN: usize = 6;
pub const PASSWORD_MAX: usize = 32;

/// Problems with the login form, one message per field at most
pub fn validate_login(user_name: &str, password: &str) -> Vec<String> {
    let mut errors = Vec::new();

    let user_len = user_name.trim().chars().count();
    if user_len < USER_MIN {
        errors.push(format!("El usuario debe tener al menos {} caracteres", USER_MIN));
    } else if user_len > USER_MAX {
        errors.push(format!("El usuario no puede superar los {} caracteres", USER_MAX));
    }

    let password_len = password.chars().count();
    if password_len < PASSWORD_MIN {
        errors.push(format!(
            "La contraseña debe tener al menos {} caracteres",
            PASSWORD_MIN
        ));
    } else if password_len > PASSWORD_MAX {
        errors.push(format!(
            "La contraseña no puede superar los {} caracteres",
            PASSWORD_MAX
        ));
    }

    errors
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_login() {
        assert!(validate_login("ana", "secreto").is_empty());
    }

    #[test]
    fn test_short_fields() {
        let errors = validate_login("al", "123");
        assert_eq!(errors.len(), 2);
        assert!(errors[0].contains("usuario"));
        assert!(errors[1].contains("contraseña"));
    }

    #[test]
    fn test_long_fields() {
        let errors = validate_login(&"a".repeat(21), &"b".repeat(33));
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_counts_characters() {
        assert!(validate_login("ñañ", "ñññññń").is_empty());
    }
}
