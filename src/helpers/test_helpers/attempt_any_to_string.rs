use super::*;

/// Best-effort description of a panic payload
pub fn attempt_any_to_string(any: &dyn Any) -> String {
    if let Some(s) = any.downcast_ref::<&str>() {
        format!("&str{{ {:?} }}", s)
    } else if let Some(s) = any.downcast_ref::<String>() {
        format!("String{{ {:?} }}", s)
    } else if let Some(b) = any.downcast_ref::<Box<dyn Any + Send>>() {
        format!("Box{{ {} }}", attempt_any_to_string(&**b))
    } else {
        format!("non-string Any value with {:?}", any.type_id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describes_strings() {
        assert_eq!(attempt_any_to_string(&"foo"), "&str{ \"foo\" }");
        assert_eq!(attempt_any_to_string(&"foo".to_string()), "String{ \"foo\" }");
    }

    #[test]
    fn describes_panic_payload() {
        let payload = std::panic::catch_unwind(|| {
            panic!("boom");
        })
        .unwrap_err();
        assert_eq!(attempt_any_to_string(&payload), "Box{ &str{ \"boom\" } }");
    }
}
