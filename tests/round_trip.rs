use chapter_edit::{
    Config, EditedChapter,
    display::{decode_display, encode_display},
    ffmetadata::{decode_metadata, encode_metadata},
};

#[test]
fn test_pipeline_round_trip() {
    let config = Config::default();
    let chapters = vec![
        EditedChapter::new("Cold open", 0),
        EditedChapter::new("Part 1", 95),
        EditedChapter::new("Part#2", 95),
        EditedChapter::new("Credits", 1_790),
    ];

    let text = encode_metadata(&chapters, 1_800, config.timebase, &[]).unwrap();
    let decoded = decode_metadata(&text, 1_800, &config).unwrap();
    let display = encode_display(&decoded.chapters).unwrap();

    assert_eq!(decode_display(&display).unwrap(), chapters);
}

#[test]
fn test_round_trip_resets_timebase() {
    let config = Config::default();
    let source = "\
;FFMETADATA1
[CHAPTER]
TIMEBASE=1/1000000000
START=0
END=12500000000
title=A
[CHAPTER]
TIMEBASE=1/1000000000
START=12500000000
END=30000000000
title=B
";

    let decoded = decode_metadata(source, 30, &config).unwrap();
    let edited = decode_display(&encode_display(&decoded.chapters).unwrap()).unwrap();
    assert_eq!(edited, vec![EditedChapter::new("A", 0), EditedChapter::new("B", 12)]);

    let text = encode_metadata(&edited, 30, config.timebase, &[]).unwrap();
    let reencoded = decode_metadata(&text, 30, &config).unwrap();
    assert!(reencoded.chapters.iter().all(|c| c.timebase == 1000));
    assert_eq!(reencoded.chapters[0].end, 12_000);
    assert_eq!(reencoded.chapters[1].end, 30_000);
}
