use crate::{
    codec, DataTableCellDataDto, DataTableRowDataDto, Handle, HandleFormat, IncidentDto,
    JsonCodec,
};

#[cfg(test)]
mod type_tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use serde_json::json;

    fn incident_with_creator() -> IncidentDto {
        IncidentDto {
            creator_id: Some(Handle::new(81_231, "c2f7a0e4-analyst")),
            ..IncidentDto::default()
        }
    }

    #[test]
    fn test_incident_body_per_format() {
        let incident = incident_with_creator();
        let expected = [
            (
                HandleFormat::Default,
                r#"{"creator_id":{"id":81231,"name":"c2f7a0e4-analyst"}}"#,
            ),
            (
                HandleFormat::Objects,
                r#"{"creator_id":{"id":81231,"name":"c2f7a0e4-analyst"}}"#,
            ),
            (HandleFormat::Ids, r#"{"creator_id":81231}"#),
            (HandleFormat::Names, r#"{"creator_id":"c2f7a0e4-analyst"}"#),
        ];
        for (format, json) in expected {
            assert_eq!(JsonCodec::new(format).to_string(&incident).unwrap(), json, "{format}");
        }
    }

    #[test]
    fn test_objects_end_to_end() {
        let codec = JsonCodec::new(HandleFormat::Objects);
        let incident = IncidentDto {
            incident_type_ids: vec![Handle::new(7, "Spoofing")],
            ..IncidentDto::default()
        };
        let json = codec.to_string(&incident).unwrap();
        assert_eq!(json, r#"{"incident_type_ids":[{"id":7,"name":"Spoofing"}]}"#);
        let decoded: IncidentDto = codec.from_str(&json).unwrap();
        assert_eq!(decoded, incident);
    }

    #[test]
    fn test_default_reads_mixed_server_output() {
        let codec = JsonCodec::new(HandleFormat::Default);
        let decoded: IncidentDto = codec
            .from_value(json!({
                "owner_id": 12,
                "phase_id": "Respond",
                "severity_code": {"id": 50, "name": "Low"},
                "creator_id": null,
                "discovered_date": 1_700_000_000_000i64
            }))
            .unwrap();
        assert_eq!(decoded.owner_id, Some(Handle::from_id(12)));
        assert_eq!(decoded.phase_id, Some(Handle::from_name("Respond")));
        assert_eq!(decoded.severity_code, Some(Handle::new(50, "Low")));
        assert_eq!(decoded.creator_id, None);
        assert_eq!(
            decoded.discovered_date,
            Some(Utc.timestamp_millis_opt(1_700_000_000_000).unwrap())
        );
    }

    #[test]
    fn test_strict_format_aborts_whole_dto() {
        let codec = JsonCodec::new(HandleFormat::Names);
        let result = codec.from_str::<IncidentDto>(r#"{"name":"Phish","owner_id":12}"#);
        let err = result.unwrap_err();
        assert!(err.to_string().contains("integer"));
    }

    #[test]
    fn test_data_table_row_round_trip() {
        let mut row = DataTableRowDataDto::default();
        row.cells.insert(
            Handle::from_name("one_two_three"),
            DataTableCellDataDto {
                id: Some(Handle::from_id(1)),
                row_id: Some(2),
                value: Some(json!("value")),
            },
        );

        let codec = JsonCodec::new(HandleFormat::Default);
        let json = codec.to_value(&row).unwrap();
        assert_eq!(
            json,
            json!({"cells": {"one_two_three": {
                "id": {"id": 1, "name": null},
                "row_id": 2,
                "value": "value"
            }}})
        );
        let decoded: DataTableRowDataDto = codec.from_value(json).unwrap();
        assert_eq!(decoded, row);
    }

    #[test]
    fn test_map_keys_ignore_session_format() {
        let mut row = DataTableRowDataDto::default();
        row.cells.insert(Handle::new(4, "status"), DataTableCellDataDto::default());
        let ids = JsonCodec::new(HandleFormat::Ids).to_value(&row).unwrap();
        let names = JsonCodec::new(HandleFormat::Names).to_value(&row).unwrap();
        assert_eq!(ids, names);
        assert!(ids["cells"].get("status").is_some());
    }

    #[test]
    fn test_mixed_map_written_by_name_and_read_per_key() {
        let mut row = DataTableRowDataDto::default();
        row.cells.insert(Handle::from_id(3), DataTableCellDataDto::default());
        row.cells.insert(Handle::new(4, "status"), DataTableCellDataDto::default());
        let codec = JsonCodec::default();
        let json = codec.to_value(&row).unwrap();
        assert_eq!(json, json!({"cells": {"3": {}, "status": {}}}));

        let decoded: DataTableRowDataDto = codec.from_value(json).unwrap();
        assert!(decoded.cell(&Handle::from_id(3)).is_some());
        assert!(decoded.cell(&Handle::from_name("status")).is_some());
        assert!(decoded.cell(&Handle::new(4, "status")).is_none());
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn handle_for(format: HandleFormat) -> BoxedStrategy<Handle> {
        match format {
            HandleFormat::Ids => any::<i64>().prop_map(Handle::from_id).boxed(),
            HandleFormat::Names => "[a-zA-Z0-9 _.-]{0,24}".prop_map(Handle::from_name).boxed(),
            HandleFormat::Objects | HandleFormat::Default => {
                (proptest::option::of(any::<i64>()), proptest::option::of(".{0,24}"))
                    .prop_map(|(id, name)| Handle { id, name })
                    .boxed()
            }
        }
    }

    fn format_and_handle() -> impl Strategy<Value = (HandleFormat, Handle)> {
        prop::sample::select(HandleFormat::ALL.to_vec())
            .prop_flat_map(|format| (Just(format), handle_for(format)))
    }

    proptest! {
        #[test]
        fn decode_inverts_encode((format, handle) in format_and_handle()) {
            let token = codec::encode(Some(&handle), format);
            let decoded = codec::decode(&token, format).unwrap();
            prop_assert_eq!(decoded, handle);
        }

        #[test]
        fn codec_text_round_trip((format, handle) in format_and_handle()) {
            let codec = JsonCodec::new(format);
            let json = codec.to_string(&handle).unwrap();
            let decoded: Handle = codec.from_str(&json).unwrap();
            prop_assert_eq!(decoded, handle);
        }
    }
}
