//! End-to-end load scenarios.

use crate::container::tests::{build_wad, build_zip};
use crate::{
    ContainerSource, Error, FileSystem, LoadInput, LoadOptions, LoadSettings, LumpFlags,
    MessageLevel, Namespace, ResourceFile,
};
use camino::Utf8PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

fn zip_input(name: &str, files: &[(&str, &[u8])]) -> LoadInput {
    LoadInput::Memory {
        name: name.to_string(),
        data: Arc::from(build_zip(files, true)),
    }
}

fn wad_input(name: &str, lumps: &[(&str, &[u8])]) -> LoadInput {
    LoadInput::Memory {
        name: name.to_string(),
        data: Arc::from(build_wad(lumps)),
    }
}

fn load(inputs: Vec<LoadInput>) -> FileSystem {
    init_tracing();
    let mut fs = FileSystem::new();
    fs.init_multiple_files(inputs, LoadOptions::default()).unwrap();
    fs
}

fn read_string(fs: &FileSystem, index: usize) -> String {
    String::from_utf8(fs.read_file(index).unwrap()).unwrap()
}

#[test]
fn test_later_container_overrides_earlier() {
    let fs = load(vec![
        wad_input("base.wad", &[("FOO", b"base"), ("BAR", b"bar")]),
        wad_input("mod.wad", &[("FOO", b"mod")]),
    ]);

    let index = fs.check_num_for_name("foo", Namespace::GLOBAL).unwrap();
    assert_eq!(fs.file_container(index), Some(1));
    assert_eq!(read_string(&fs, index), "mod");

    let bar = fs.check_num_for_name("BAR", Namespace::GLOBAL).unwrap();
    assert_eq!(fs.file_container(bar), Some(0));
}

#[test]
fn test_full_name_override_and_ignore_ext() {
    let fs = load(vec![
        zip_input("a.pk3", &[("sprites/foo.png", b"a"), ("sprites/foobar.png", b"ab")]),
        zip_input("b.pk3", &[("Sprites/FOO.png", b"b")]),
    ]);

    let index = fs.check_num_for_full_name("sprites/foo.png").unwrap();
    assert_eq!(fs.file_container(index), Some(1));

    let no_ext = fs
        .check_num_for_full_name_with("sprites/foo", false, Namespace::GLOBAL, true)
        .unwrap();
    assert_eq!(no_ext, index);
    assert_eq!(fs.file_full_name(no_ext, false), Some("sprites/foo.png"));
}

#[test]
fn test_long_path_never_matches_short_lookup() {
    let fs = load(vec![zip_input("a.pk3", &[("sprites/trooa1.png", b"x")])]);
    assert!(fs.check_num_for_name("TROOA1", Namespace::SPRITES).is_some());
    assert_eq!(fs.check_num_for_name("sprites/trooa1", Namespace::SPRITES), None);
    assert_eq!(fs.check_num_for_name("trooa1.png", Namespace::SPRITES), None);
}

#[test]
fn test_resource_id_tag() {
    let fs = load(vec![zip_input("a.pk3", &[("sounds/mything.{42}.wav", b"riff")])]);
    let index = fs.find_resource(42, "wav", None).unwrap();
    assert_eq!(fs.file_full_name(index, false), Some("sounds/mything.wav"));
    assert_eq!(fs.resource_id(index), Some(42));
    assert_eq!(fs.file_namespace(index), Namespace::SOUNDS);
    assert_eq!(fs.get_resource(42, "wav", Some(0)).unwrap(), index);
    assert!(matches!(fs.get_resource(42, "ogg", None), Err(Error::NotFound(_))));
}

#[test]
fn test_atomic_folder_override() {
    let fs = load(vec![
        zip_input("c1.pk3", &[("sprites/a.png", b"a")]),
        zip_input("c2.pk3", &[("sprites/b.png", b"b")]),
    ]);

    let atomic: Vec<String> = fs
        .get_files_in_folder("sprites/", true)
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(atomic, vec!["sprites/b.png"]);

    let merged: Vec<String> = fs
        .get_files_in_folder("sprites", false)
        .into_iter()
        .map(|e| e.name)
        .collect();
    assert_eq!(merged, vec!["sprites/a.png", "sprites/b.png"]);
}

#[test]
fn test_read_round_trip() {
    let body = b"lorem ipsum dolor sit amet ".repeat(8);
    let fs = load(vec![
        LoadInput::Memory {
            name: "stored.pk3".to_string(),
            data: Arc::from(build_zip(&[("stored.txt", &body)], false)),
        },
        zip_input("deflated.pk3", &[("deflated.txt", &body)]),
        wad_input("plain.wad", &[("PLAIN", &body)]),
    ]);

    for index in 0..fs.num_entries() {
        let first = fs.read_file(index).unwrap();
        let second = fs.read_file(index).unwrap();
        assert_eq!(first.len() as u64, fs.file_length(index).unwrap());
        assert_eq!(first, second);
        assert_eq!(first, body);
    }

    let stored = fs.check_num_for_full_name("stored.txt").unwrap();
    let deflated = fs.check_num_for_full_name("deflated.txt").unwrap();
    assert!(fs.file_offset(stored).is_some());
    assert_eq!(fs.file_offset(deflated), None);
    assert!(fs.file_flags(deflated).contains(LumpFlags::COMPRESSED));
}

#[test]
fn test_read_from_disk() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let wad_path = dir.path().join("DOOM.WAD");
    std::fs::write(&wad_path, build_wad(&[("PLAYPAL", b"palette"), ("E1M1", b"")])).unwrap();
    let wad_path = Utf8PathBuf::from_path_buf(wad_path).unwrap();

    let mut fs = FileSystem::new();
    fs.init_single_file(wad_path.clone(), LoadOptions::default())
        .unwrap();

    let index = fs.get_num_for_name("PLAYPAL", Namespace::GLOBAL).unwrap();
    assert_eq!(fs.read_file(index).unwrap(), b"palette");
    assert!(!fs.open_reader(index).unwrap().is_buffered());
    assert!(fs.reopen_reader(index, true).unwrap().is_buffered());
    assert_eq!(fs.resource_file_name(0), Some("DOOM.WAD"));
    assert_eq!(fs.resource_file_full_name(0), Some(wad_path.as_str()));
    assert_eq!(fs.check_if_resource_file_loaded("doom.wad"), Some(0));
    assert_eq!(fs.check_if_resource_file_loaded(wad_path.as_str()), Some(0));
    assert_eq!(fs.file_full_path(index).unwrap(), "DOOM.WAD:PLAYPAL");

    let empty = fs.check_num_for_name("E1M1", Namespace::GLOBAL).unwrap();
    assert_eq!(fs.read_file(empty).unwrap(), b"");
}

#[test]
fn test_after_iwad_relocation() {
    let settings = LoadSettings {
        iwad_index: Some(1),
        max_iwad_index: Some(1),
        ..Default::default()
    };
    let mut fs = FileSystem::new();
    fs.init_multiple_files(
        vec![
            zip_input(
                "engine.pk3",
                &[("after_iwad/foo.txt", b"engine"), ("engine.txt", b"e")],
            ),
            zip_input("iwad.pk3", &[("foo.txt", b"iwad")]),
            zip_input("mod.pk3", &[("after_iwad/bar.txt", b"ignored")]),
        ],
        LoadOptions::new(settings),
    )
    .unwrap();

    let original = fs.check_num_for_full_name("after_iwad/foo.txt").unwrap();
    let moved = fs.check_num_for_full_name("foo.txt").unwrap();
    assert!(moved > original);
    assert_eq!(read_string(&fs, moved), "engine");
    assert_eq!(fs.file_container(moved), Some(1));

    // The original stays addressable but is empty.
    assert_eq!(fs.file_length(original), Some(0));
    assert!(fs.read_file(original).unwrap().is_empty());

    // Content from containers at or after the main file is never relocated.
    assert!(fs.check_num_for_full_name("after_iwad/bar.txt").is_some());
    assert_eq!(fs.check_num_for_full_name("bar.txt"), None);
    assert_eq!(fs.num_entries(), 5);
}

#[test]
fn test_relocation_without_iwad_index() {
    let mut fs = FileSystem::new();
    fs.add_lump("after_iwad/a.txt", &b"a"[..]);
    fs.add_lump("b.txt", &b"b"[..]);

    assert_eq!(fs.move_lumps_in_folder("AFTER_IWAD/"), 1);
    fs.rebuild_index();

    let moved = fs.check_num_for_full_name("a.txt").unwrap();
    assert_eq!(moved, 2);
    assert_eq!(fs.read_file(moved).unwrap(), b"a");
    assert_eq!(fs.file_container(moved), None);
    assert_eq!(fs.move_lumps_in_folder("missing/"), 0);
}

#[test]
fn test_filter_relocation_by_hash() {
    let target = Arc::<[u8]>::from(build_zip(&[("target.txt", b"t")], true));
    let hash = ResourceFile::open(
        "target.pk3",
        ContainerSource::Memory(target.clone()),
        &LoadSettings::default(),
    )
    .unwrap()
    .content_hash()
    .unwrap()
    .to_string();

    let filtered = format!("filter/{}/mapinfo.txt", hash);
    let fs = load(vec![
        zip_input("base.pk3", &[("mapinfo.txt", b"base"), (&filtered, b"patched")]),
        LoadInput::Memory {
            name: "target.pk3".to_string(),
            data: target,
        },
    ]);

    let index = fs.check_num_for_full_name("mapinfo.txt").unwrap();
    assert_eq!(read_string(&fs, index), "patched");
    assert_eq!(fs.file_container(index), Some(1));
}

#[test]
fn test_filter_for_absent_file_stays_put() {
    let fs = load(vec![zip_input(
        "base.pk3",
        &[
            ("mapinfo.txt", b"base"),
            ("filter/0123456789abcdef0123456789abcdef/mapinfo.txt", b"patched"),
        ],
    )]);
    let index = fs.check_num_for_full_name("mapinfo.txt").unwrap();
    assert_eq!(read_string(&fs, index), "base");
}

#[test]
fn test_empty_input_list_fails() {
    let mut fs = FileSystem::new();
    let result = fs.init_multiple_files(Vec::<LoadInput>::new(), LoadOptions::default());
    assert!(matches!(result, Err(Error::EmptyResult)));
    assert_eq!(fs.num_entries(), 0);
    assert_eq!(fs.check_num_for_full_name("anything"), None);
}

#[test]
fn test_missing_inputs_are_reported_and_skipped() {
    let messages: Arc<Mutex<Vec<(MessageLevel, String)>>> = Arc::default();
    let sink = messages.clone();
    let options = LoadOptions::default().with_messages(move |level, text| {
        sink.lock().unwrap().push((level, text.to_string()));
    });

    let mut fs = FileSystem::new();
    let result = fs.init_multiple_files(["/definitely/not/here.wad"], options);
    assert!(matches!(result, Err(Error::EmptyResult)));

    let messages = messages.lock().unwrap();
    assert_eq!(messages[0].0, MessageLevel::Error);
    assert_eq!(
        messages[0].1,
        "/definitely/not/here.wad: File or Directory not found"
    );
}

#[test]
fn test_progress_messages() {
    let messages: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = messages.clone();
    let options = LoadOptions::default().with_messages(move |_, text| {
        sink.lock().unwrap().push(text.to_string());
    });

    let mut fs = FileSystem::new();
    fs.init_multiple_files(
        vec![
            wad_input("a.wad", &[("A", b"a"), ("B", b"b")]),
            LoadInput::from("/definitely/not/here.pk3"),
        ],
        options,
    )
    .unwrap();

    let messages = messages.lock().unwrap();
    assert_eq!(messages[0], "adding a.wad, 2 lumps");
    assert_eq!(fs.num_resource_files(), 1);
}

#[test]
fn test_embedded_wad_in_zip() {
    let inner = build_wad(&[("PLAYPAL", b"inner"), ("MAP01", b"")]);
    let fs = load(vec![zip_input(
        "mod.pk3",
        &[("extra.wad", &inner), ("mapinfo.txt", b"m")],
    )]);

    assert_eq!(fs.num_resource_files(), 2);
    assert_eq!(fs.resource_file_full_name(1), Some("mod.pk3:extra.wad"));
    assert_eq!(fs.first_entry(1), Some(2));
    assert_eq!(fs.last_entry(1), Some(3));
    assert_eq!(fs.entry_count(1), 2);
    assert_eq!(fs.check_if_resource_file_loaded("mod.pk3:extra.wad"), Some(1));

    let playpal = fs.check_num_for_name("PLAYPAL", Namespace::GLOBAL).unwrap();
    assert_eq!(fs.file_container(playpal), Some(1));
    assert_eq!(read_string(&fs, playpal), "inner");

    // The archive member itself is hidden.
    assert_eq!(fs.file_namespace(0), Namespace::HIDDEN);
    assert_eq!(fs.file_full_name(0, false), None);
    assert!(fs.file_flags(0).contains(LumpFlags::EMBEDDED));
}

#[test]
fn test_broken_embedded_wad_is_skipped() {
    let messages: Arc<Mutex<Vec<(MessageLevel, String)>>> = Arc::default();
    let sink = messages.clone();
    let options = LoadOptions::default().with_messages(move |level, text| {
        sink.lock().unwrap().push((level, text.to_string()));
    });

    let mut fs = FileSystem::new();
    fs.init_multiple_files(
        vec![zip_input("m.pk3", &[("bad.wad", b"PWAD"), ("mapinfo.txt", b"m")])],
        options,
    )
    .unwrap();

    assert_eq!(fs.num_resource_files(), 1);
    assert_eq!(fs.num_entries(), 2);
    assert!(fs.check_num_for_full_name("mapinfo.txt").is_some());

    let messages = messages.lock().unwrap();
    assert!(messages
        .iter()
        .any(|(level, text)| *level == MessageLevel::Error && text.starts_with("m.pk3:bad.wad: ")));
}

#[test]
fn test_truncated_file_reports_shortfall() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pack = dir.path().join("pack");
    std::fs::create_dir_all(&pack).unwrap();
    std::fs::write(pack.join("a.txt"), b"0123456789").unwrap();
    let pack = Utf8PathBuf::from_path_buf(pack).unwrap();

    let mut fs = FileSystem::new();
    fs.init_single_file(pack.clone(), LoadOptions::default())
        .unwrap();
    let index = fs.check_num_for_full_name("a.txt").unwrap();
    assert_eq!(fs.file_length(index), Some(10));

    std::fs::write(pack.join("a.txt"), b"0123").unwrap();
    match fs.read_file(index) {
        Err(Error::ReadShortfall {
            name,
            read,
            expected,
        }) => {
            assert_eq!(name, "a.txt");
            assert_eq!(read, 4);
            assert_eq!(expected, 10);
        }
        other => panic!("unexpected result: {:?}", other),
    }
}

#[test]
fn test_wad_marker_namespaces() {
    let fs = load(vec![wad_input(
        "sprites.wad",
        &[
            ("S_START", b""),
            ("TROOA1", b"imp"),
            ("S_END", b""),
            ("D_RUNNIN", b"mus"),
        ],
    )]);

    let sprite = fs.check_num_for_name("TROOA1", Namespace::SPRITES).unwrap();
    assert_eq!(fs.file_namespace(sprite), Namespace::SPRITES);
    assert_eq!(fs.check_num_for_name("TROOA1", Namespace::GLOBAL), None);

    // Folder-only namespaces accept global WAD lumps.
    let music = fs.check_num_for_name("D_RUNNIN", Namespace::MUSIC).unwrap();
    assert_eq!(fs.file_namespace(music), Namespace::GLOBAL);
    assert_eq!(fs.check_num_for_name("D_RUNNIN", Namespace::FLATS), None);
}

#[test]
fn test_container_restricted_lookups() {
    let fs = load(vec![
        wad_input("a.wad", &[("DEMO1", b"a")]),
        wad_input("b.wad", &[("DEMO1", b"b")]),
        zip_input("c.pk3", &[("demo1.lmp", b"c")]),
    ]);

    assert_eq!(fs.check_num_for_name_in("DEMO1", Namespace::GLOBAL, Some(0), true), Some(0));
    assert_eq!(fs.check_num_for_name_in("DEMO1", Namespace::GLOBAL, Some(1), false), Some(1));
    assert_eq!(fs.check_num_for_name_in("DEMO1", Namespace::GLOBAL, Some(1), true), Some(1));
    assert_eq!(fs.check_num_for_name_in("DEMO1", Namespace::GLOBAL, None, false), Some(2));

    assert_eq!(fs.check_num_for_full_name_in("demo1.lmp", Some(2)), Some(2));
    assert_eq!(fs.check_num_for_full_name_in("demo1.lmp", Some(1)), None);
}

#[test]
fn test_lookups_stable_across_rebuild() {
    let mut fs = load(vec![
        wad_input("a.wad", &[("PLAYPAL", b"p"), ("COLORMAP", b"c")]),
        zip_input("b.pk3", &[("graphics/titlepic.png", b"t"), ("textures/wall.png", b"w")]),
    ]);

    let queries = |fs: &FileSystem| {
        (
            fs.check_num_for_name("PLAYPAL", Namespace::GLOBAL),
            fs.check_num_for_name("TITLEPIC", Namespace::GRAPHICS),
            fs.check_num_for_full_name("textures/wall.png"),
            fs.find_file_with_extensions("graphics/titlepic", &["png"]),
        )
    };
    let before = queries(&fs);
    fs.rebuild_index();
    assert_eq!(before, queries(&fs));
    assert!(before.0.is_some() && before.1.is_some() && before.2.is_some() && before.3.is_some());
}

#[test]
fn test_duplicate_inputs() {
    let input = wad_input("a.wad", &[("A", b"a")]);

    let mut fs = FileSystem::new();
    fs.init_multiple_files(vec![input.clone(), input.clone()], LoadOptions::default())
        .unwrap();
    assert_eq!(fs.num_resource_files(), 2);

    let settings = LoadSettings {
        allow_duplicates: true,
        ..Default::default()
    };
    fs.init_multiple_files(vec![input.clone(), input], LoadOptions::new(settings))
        .unwrap();
    assert_eq!(fs.num_resource_files(), 1);
    assert_eq!(fs.num_entries(), 1);
}

#[test]
fn test_post_process_hook_runs_before_indexing() {
    let mut fs = FileSystem::new();
    let options = LoadOptions::default().with_post_process(|fs| {
        fs.add_lump("injected.txt", &b"hi"[..]);
    });
    fs.init_multiple_files(vec![wad_input("a.wad", &[("A", b"a")])], options)
        .unwrap();

    let index = fs.check_num_for_full_name("injected.txt").unwrap();
    assert_eq!(read_string(&fs, index), "hi");
}

#[test]
fn test_audit_log_through_pipeline() {
    let mut log = Vec::new();
    let mut fs = FileSystem::new();
    fs.init_multiple_files(
        vec![zip_input(
            "mod.pk3",
            &[("extra.wad", &build_wad(&[("PLAYPAL", b"abc")])), ("a.txt", b"abc")],
        )],
        LoadOptions::default().with_audit(&mut log),
    )
    .unwrap();

    let text = String::from_utf8(log).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    // The nested container is finished before its parent's entries are logged.
    assert!(lines[0].starts_with("file: mod.pk3:extra.wad, hash: "));
    assert_eq!(
        lines[1],
        "file: mod.pk3:extra.wad, lump: PLAYPAL, hash: 900150983CD24FB0D6963F7D28E17F72, size: 3"
    );
    assert!(lines[2].starts_with("file: mod.pk3, hash: "));
    assert_eq!(
        lines[3],
        "file: mod.pk3, lump: a.txt, hash: 900150983CD24FB0D6963F7D28E17F72, size: 3"
    );
    assert_eq!(lines.len(), 4);
}

#[test]
fn test_directory_and_loose_file_inputs() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let pack = dir.path().join("pack");
    std::fs::create_dir_all(pack.join("sprites")).unwrap();
    std::fs::write(pack.join("sprites").join("TROOA1.png"), b"imp").unwrap();
    std::fs::write(pack.join("mapinfo.txt"), b"map").unwrap();
    let loose = dir.path().join("DEHACKED.deh");
    std::fs::write(&loose, b"Patch File").unwrap();

    let pack = Utf8PathBuf::from_path_buf(pack).unwrap();
    let loose = Utf8PathBuf::from_path_buf(loose).unwrap();

    let mut fs = FileSystem::new();
    fs.init_multiple_files([pack.clone(), loose], LoadOptions::default())
        .unwrap();

    assert_eq!(fs.num_resource_files(), 2);
    let sprite = fs.check_num_for_name("TROOA1", Namespace::SPRITES).unwrap();
    assert_eq!(read_string(&fs, sprite), "imp");
    let deh = fs.check_num_for_full_name("dehacked.deh").unwrap();
    assert_eq!(fs.file_container(deh), Some(1));
    assert_eq!(read_string(&fs, deh), "Patch File");
    assert_eq!(fs.resource_file_name(0), Some("pack"));
}

#[test]
fn test_reload_replaces_state() {
    let mut fs = load(vec![wad_input("a.wad", &[("A", b"a")])]);
    fs.init_multiple_files(vec![wad_input("b.wad", &[("B", b"b")])], LoadOptions::default())
        .unwrap();
    assert_eq!(fs.num_resource_files(), 1);
    assert_eq!(fs.check_num_for_name("A", Namespace::GLOBAL), None);
    assert!(fs.check_num_for_name("B", Namespace::GLOBAL).is_some());
}
