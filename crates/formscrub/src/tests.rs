mod batch_scenarios {
    use crate::{FieldSet, Policy, Sanitizer};

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    #[test]
    fn test_field_with_script_is_retained_with_clean_value() {
        init_logging();
        let mut fields = FieldSet::new();
        fields.insert_values("title", ["<script>alert(1)</script>"]);

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        assert_eq!(
            results.field_values("title"),
            Some(&[String::new()][..])
        );
        assert!(results.number_of_errors() >= 1);
        assert!(results
            .error_messages()
            .iter()
            .any(|m| m.contains("script")));
    }

    #[test]
    fn test_clean_field_is_dropped_from_result() {
        let mut fields = FieldSet::new();
        fields.insert_values("title", ["hello world"]);

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        assert!(!results.contains_field("title"));
        assert!(results.clean_html_map().is_none());
        assert!(results.is_clean());
    }

    #[test]
    fn test_null_only_field_is_absent() {
        let mut fields = FieldSet::new();
        fields.insert("bio", Some(vec![None]));

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        assert!(!results.contains_field("bio"));
    }

    #[test]
    fn test_null_value_sequence_is_skipped_entirely() {
        let mut fields = FieldSet::new();
        fields.insert("ghost", None);

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        assert!(results.is_clean());
    }

    #[test]
    fn test_only_dirty_fields_survive() {
        let mut fields = FieldSet::new();
        fields.insert_values("a", ["<p>ok</p>"]);
        fields.insert_values("b", ["<img onerror=x>"]);

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        assert!(!results.contains_field("a"));
        assert!(results.contains_field("b"));
        let map = results.clean_html_map().unwrap();
        assert_eq!(map.len(), 1);
        assert!(!map["b"][0].contains("onerror"));
    }

    #[test]
    fn test_expanding_clean_output_becomes_placeholder() {
        init_logging();
        let mut fields = FieldSet::new();
        // onclick errors the value; entity escaping grows it past the
        // input length, so the cleaned markup is not trusted.
        fields.insert_values("body", ["<b onclick=x>&&&&&&</b>"]);

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        assert_eq!(
            results.field_values("body"),
            Some(&[" ".to_owned()][..])
        );
        assert!(results.number_of_errors() >= 1);
    }

    #[test]
    fn test_retained_field_keeps_positional_correspondence() {
        let mut fields = FieldSet::new();
        fields.insert(
            "bio",
            Some(vec![
                None,
                Some("<script>x</script>".to_owned()),
                Some(String::new()),
            ]),
        );

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        let values = results.field_values("bio").unwrap();
        assert_eq!(values.len(), 3);
        assert_eq!(values[0], "");
        assert_eq!(values[1], "");
        assert_eq!(values[2], "");
        assert_eq!(results.number_of_errors(), 1);
    }

    #[test]
    fn test_error_messages_follow_scan_order() {
        let mut fields = FieldSet::new();
        fields.insert_values(
            "first",
            [
                "<script>a</script>",
                "<img onerror=x src=\"http://e/i.png\">",
            ],
        );
        fields.insert_values("second", ["<a href=\"javascript:x\">l</a>"]);

        let results = Sanitizer::new()
            .scan_fields(&fields, &Policy::default())
            .unwrap();

        let messages = results.error_messages();
        assert_eq!(messages.len(), 3);
        assert!(messages[0].contains("script"));
        assert!(messages[1].contains("onerror"));
        assert!(messages[2].contains("javascript:"));
    }

    #[test]
    fn test_batch_result_is_fresh_per_invocation() {
        let mut fields = FieldSet::new();
        fields.insert_values("title", ["<script>x</script>"]);
        let sanitizer = Sanitizer::new();
        let policy = Policy::default();

        let first = sanitizer.scan_fields(&fields, &policy).unwrap();
        let second = sanitizer.scan_fields(&fields, &policy).unwrap();

        assert_eq!(first.number_of_errors(), second.number_of_errors());
        assert_eq!(
            first.field_values("title"),
            second.field_values("title")
        );
    }

    #[test]
    fn test_policy_round_trip_scans_identically() -> anyhow::Result<()> {
        let policy = Policy::default();
        let reloaded = Policy::from_json(&policy.to_json()?)?;

        let sanitizer = Sanitizer::new();
        let markup = "<p>a</p><script>b</script>";
        let original = sanitizer.scan(markup, &policy)?;
        let round_tripped = sanitizer.scan(markup, &reloaded)?;

        assert_eq!(original.clean_html(), round_tripped.clean_html());
        assert_eq!(
            original.number_of_errors(),
            round_tripped.number_of_errors()
        );
        Ok(())
    }
}

mod failure_modes {
    use std::io;

    use crate::engine::DomScanner;
    use crate::serialize::SerializeDocument;
    use crate::{FieldSet, Policy, PolicyError, Sanitizer, ScanError};

    struct FailingSerializer;

    impl SerializeDocument for FailingSerializer {
        fn write_document(
            &self,
            _document: &ammonia::Document,
            _sink: &mut Vec<u8>,
        ) -> io::Result<()> {
            Err(io::Error::new(io::ErrorKind::Other, "sink unavailable"))
        }
    }

    #[test]
    fn test_invalid_policy_is_fatal_for_batch() {
        let mut policy = Policy::default();
        policy.url_schemes.insert("javascript".into());
        let mut fields = FieldSet::new();
        fields.insert_values("title", ["x"]);

        let err = Sanitizer::new().scan_fields(&fields, &policy).unwrap_err();
        assert!(matches!(err, PolicyError::Invalid { .. }));
    }

    #[test]
    fn test_invalid_policy_is_fatal_for_single_scan() {
        let policy = Policy {
            max_input_size: 0,
            ..Policy::default()
        };
        let err = Sanitizer::new().scan("x", &policy).unwrap_err();
        assert!(matches!(err, ScanError::Policy(_)));
    }

    #[test]
    fn test_oversized_value_does_not_abort_batch() {
        let policy = Policy {
            max_input_size: 10,
            ..Policy::default()
        };
        let mut fields = FieldSet::new();
        fields.insert_values("long", ["<p>0123456789</p>"]);
        fields.insert_values("ok", ["hi"]);

        let results = Sanitizer::new().scan_fields(&fields, &policy).unwrap();

        assert_eq!(
            results.field_values("long"),
            Some(&[" ".to_owned()][..])
        );
        assert!(results
            .error_messages()
            .iter()
            .any(|m| m.contains("could not be cleaned")));
        assert!(!results.contains_field("ok"));
    }

    #[test]
    fn test_serialization_failure_is_a_scan_failure() {
        let sanitizer = Sanitizer::new();
        let engine = DomScanner::with_serializer(FailingSerializer);
        let err = sanitizer
            .scan_with("<p>x</p>", &Policy::default(), &engine)
            .unwrap_err();
        assert!(matches!(err, ScanError::Serialize(_)));
    }

    #[test]
    fn test_serialization_failure_in_batch_retains_field() {
        let mut fields = FieldSet::new();
        fields.insert_values("title", ["<p>x</p>"]);

        let results = Sanitizer::new()
            .scan_fields_with(&fields, &Policy::default(), || {
                DomScanner::with_serializer(FailingSerializer)
            })
            .unwrap();

        assert_eq!(
            results.field_values("title"),
            Some(&[" ".to_owned()][..])
        );
        assert_eq!(results.number_of_errors(), 1);
    }
}
