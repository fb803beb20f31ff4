use super::*;

#[test]
fn test_parse_table_name() {
    let name = parse_table_name("ACC All Positions 2025").unwrap();
    assert_eq!(name.conference, "ACC");
    assert_eq!(name.source_key, "All Positions");
    assert_eq!(name.year, 2025);
    assert_eq!(parse_table_name("big10 Center Backs 2023").unwrap().conference, "BIG10");
    assert!(parse_table_name("ACC 2025").is_none());
    assert!(parse_table_name("ACC All Positions").is_none());
}

#[test]
fn test_read_player_table_skips_text_columns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ACC All Positions 2025.csv");
    std::fs::write(
        &path,
        "Player,Team,Position,Foot,Goals per 90,\"Accurate passes, %\",Shots\n\
         Jane Doe,Alpha FC,CF,right,0.5,81%,oops\n\
         ,Alpha FC,CB,left,0.1,70,1\n\
         Ann Lee,Beta SC,LCB,left,,\"1,5\",2\n",
    )
    .unwrap();

    let (set, issues) = read_player_table(&path, "ACC", 2025).unwrap();
    assert_eq!(set.len(), 2);
    assert_eq!(
        set.catalog.names(),
        &[
            "Goals per 90".to_string(),
            "Accurate passes, %".to_string(),
            "Shots".to_string()
        ]
    );
    let jane = &set.records[0];
    assert_eq!(jane.team, "Alpha FC");
    assert_eq!(jane.get("Accurate passes, %"), Some(81.0));
    assert_eq!(jane.get("Shots"), None);
    assert_eq!(set.records[1].get("Goals per 90"), None);
    assert_eq!(set.records[1].get("Accurate passes, %"), Some(15.0));
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].kind(), "invalid_numeric_value");
}

#[test]
fn test_read_player_table_requires_player_column() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ACC All Positions 2025.csv");
    std::fs::write(&path, "Name,Goals\nJane,1\n").unwrap();
    let err = read_player_table(&path, "ACC", 2025).unwrap_err();
    assert!(matches!(err, InputError::MissingColumn { .. }));
}
