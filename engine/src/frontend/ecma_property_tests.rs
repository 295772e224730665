#[cfg(test)]
mod tests {
    use crate::config::EngineConfig;
    use crate::cst::CancellationToken;
    use crate::frontend::ecma::EcmaFrontend;
    use crate::frontend::Frontend;
    use proptest::prelude::*;
    use std::panic;

    prop_compose! {
        fn arb_js_identifier()
            (s in "[a-zA-Z_$][a-zA-Z0-9_$]{0,16}")
            -> String
        { s }
    }

    prop_compose! {
        fn arb_js_literal()
            (choice in 0usize..4,
             int_val in any::<i32>(),
             string_val in "[a-zA-Z0-9 ]{0,20}")
            -> String
        {
            match choice {
                0 => int_val.to_string(),
                1 => format!("'{string_val}'"),
                2 => "true".to_string(),
                _ => "null".to_string(),
            }
        }
    }

    prop_compose! {
        fn arb_js_source()
            (names in prop::collection::vec(arb_js_identifier(), 0..5),
             values in prop::collection::vec(arb_js_literal(), 0..5),
             body_name in arb_js_identifier())
            -> String
        {
            let mut code = String::new();
            for (name, value) in names.iter().zip(values.iter()) {
                code.push_str(&format!("const {name} = {value};\n"));
            }
            code.push_str(&format!(
                "function {body_name}() {{ return {}; }}\n",
                names.first().cloned().unwrap_or_else(|| "0".to_string())
            ));
            code
        }
    }

    proptest! {
        #[test]
        fn ecma_frontend_never_panics(source in arb_js_source()) {
            let cancel = CancellationToken::new();
            let config = EngineConfig::default();
            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                EcmaFrontend.parse(Some("fuzz.js"), source.as_bytes(), &config, &cancel)
            }));
            prop_assert!(result.is_ok(), "frontend panicked on generated source: {source:?}");
        }

        #[test]
        fn ecma_frontend_handles_unicode_identifiers(
            prefix in arb_js_identifier(),
            unicode_chars in prop::collection::vec(
                any::<char>().prop_filter("letter-ish", |c| c.is_alphanumeric() && !c.is_ascii()),
                0..6
            )
        ) {
            let ident: String = format!("{prefix}{}", unicode_chars.into_iter().collect::<String>());
            let code = format!("const {ident} = 1;");
            let cancel = CancellationToken::new();
            let config = EngineConfig::default();
            let result = panic::catch_unwind(panic::AssertUnwindSafe(|| {
                EcmaFrontend.parse(Some("fuzz.js"), code.as_bytes(), &config, &cancel)
            }));
            prop_assert!(result.is_ok(), "frontend panicked on unicode identifier");
        }
    }
}
