use eventide_types::{BackendKey, EvaluationConfig, EventideError, InputPolicy};

#[test]
fn evaluation_config_roundtrip() {
    let cfg = EvaluationConfig {
        backend: BackendKey::new("accelerated"),
        input_policy: InputPolicy::Strict,
        verify_output_schemas: false,
        verify_sampling: true,
    };

    let json = serde_json::to_string(&cfg).expect("serialize evaluation config");
    let de: EvaluationConfig = serde_json::from_str(&json).expect("deserialize evaluation config");

    assert_eq!(de.backend.as_str(), "accelerated");
    assert!(matches!(de.input_policy, InputPolicy::Strict));
    assert!(!de.verify_output_schemas);
    assert!(de.verify_sampling);
}

#[test]
fn evaluation_config_defaults() {
    let cfg = EvaluationConfig::default();
    assert_eq!(cfg.backend, BackendKey::REFERENCE);
    assert!(matches!(cfg.input_policy, InputPolicy::Lenient));
    assert!(cfg.verify_output_schemas);
    assert!(!cfg.verify_sampling);
}

#[test]
fn reference_backend_deserializes_to_the_constant() {
    let de: BackendKey = serde_json::from_str("\"reference\"").unwrap();
    assert_eq!(de, BackendKey::REFERENCE);
}

#[test]
fn errors_roundtrip_and_classify() {
    let err = EventideError::TypeCoercion {
        value: "\"x\"".into(),
        dtype: "INT32".into(),
        feature: "a".into(),
    };
    let json = serde_json::to_string(&err).unwrap();
    let de: EventideError = serde_json::from_str(&json).unwrap();
    assert_eq!(de, err);
    assert!(!de.is_structural());

    assert!(EventideError::schema_mismatch("x").is_structural());
    assert!(
        EventideError::CycleDetected {
            node: "#1".into()
        }
        .is_structural()
    );
    assert!(
        !EventideError::MissingInput {
            name: "prices".into()
        }
        .is_structural()
    );
}

#[test]
fn deserialized_backend_keys_share_one_allocation_per_name() {
    let a: BackendKey = serde_json::from_str(r#""mock""#).expect("deserialize first key");
    let b: BackendKey = serde_json::from_str(r#""mock""#).expect("deserialize second key");
    assert_eq!(a, BackendKey::new("mock"));
    assert!(std::ptr::eq(a.as_str(), b.as_str()));

    let cfg: EvaluationConfig = serde_json::from_str(
        r#"{"backend":"mock","input_policy":"Strict","verify_output_schemas":true,"verify_sampling":false}"#,
    )
    .expect("deserialize evaluation config");
    assert!(std::ptr::eq(cfg.backend.as_str(), a.as_str()));

    let reference: BackendKey = serde_json::from_str(r#""reference""#).expect("deserialize reference");
    assert!(std::ptr::eq(reference.as_str(), BackendKey::REFERENCE.as_str()));
}
