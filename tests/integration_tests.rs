use std::sync::{Arc, Barrier};
use std::thread;

use ramstore::{Directory, IndexInput, IndexOutput, RamDirectory, RamInput, RamLock, StoreError};

#[test]
fn write_seek_rewrite_then_read_back() {
    let dir = RamDirectory::new();

    let passage: Vec<u8> = (0..700).map(|i| b'a' + (i % 23) as u8).collect();
    let varint32 = 1928936378u32;
    let varint64 = 565675526378912u64;

    {
        let mut file = dir.create_output("test_file").unwrap();
        // reserve 8 bytes, rewritten below
        file.write_u64(0).unwrap();
        file.write_string(&passage).unwrap();
        file.write_varint64(varint64).unwrap();
        file.write_u32(u32::MAX).unwrap();
        file.write_varint32(varint32).unwrap();
        file.seek(0).unwrap();
        file.write_u64(u64::MAX).unwrap();

        let files = dir.list_all().unwrap();
        assert_eq!(files, vec!["test_file"]);
    }

    let mut input = dir.open_input("test_file").unwrap();
    assert_eq!(input.read_u64().unwrap(), u64::MAX);
    let mut buf = Vec::new();
    input.read_string(&mut buf).unwrap();
    assert_eq!(buf, passage);
    assert_eq!(input.read_varint64().unwrap(), varint64);
    assert_eq!(input.read_u32().unwrap(), u32::MAX);
    assert_eq!(input.read_varint32().unwrap(), varint32);

    input.seek(8).unwrap();
    input.read_string(&mut buf).unwrap();
    assert_eq!(buf, passage);
}

#[test]
fn racing_creates_have_exactly_one_winner() {
    let dir = Arc::new(RamDirectory::new());
    let barrier = Arc::new(Barrier::new(4));

    let mut handles = Vec::new();
    for _ in 0..4 {
        let dir = Arc::clone(&dir);
        let barrier = Arc::clone(&barrier);
        handles.push(thread::spawn(move || {
            barrier.wait();
            match dir.create_output("contested") {
                Ok(output) => {
                    output.close();
                    true
                }
                Err(StoreError::FileAlreadyExists(_)) => false,
                Err(e) => panic!("unexpected error: {e}"),
            }
        }));
    }

    let winners: usize = handles
        .into_iter()
        .map(|h| h.join().unwrap() as usize)
        .sum();
    assert_eq!(winners, 1);
    assert!(dir.file_exists("contested").unwrap());
}

#[test]
fn racing_lock_attempts_have_exactly_one_winner() {
    let dir = Arc::new(RamDirectory::new());
    let barrier = Arc::new(Barrier::new(2));

    let handles: Vec<_> = (0..2)
        .map(|_| {
            let dir = Arc::clone(&dir);
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                dir.obtain_lock("commit.lock").unwrap()
            })
        })
        .collect();

    // keep both handles alive until both attempts finished
    let locks: Vec<Option<RamLock>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert_eq!(locks.iter().filter(|l| l.is_some()).count(), 1);

    drop(locks);
    // released, so a later attempt succeeds
    assert!(dir.obtain_lock("commit.lock").unwrap().is_some());
}

#[test]
fn deleted_file_serves_concurrent_readers_to_completion() {
    let dir = RamDirectory::new();
    let payload: Vec<u8> = (0..3 * 4096 + 17).map(|i| (i % 251) as u8).collect();
    let payload = Arc::new(payload);

    let mut output = dir.create_output("shared").unwrap();
    output.write_bytes(&payload).unwrap();
    output.close();

    let readers: Vec<RamInput> = (0..4).map(|_| dir.open_input("shared").unwrap()).collect();
    dir.delete_file("shared").unwrap();
    assert!(!dir.file_exists("shared").unwrap());

    let handles: Vec<_> = readers
        .into_iter()
        .map(|mut input| {
            let payload = Arc::clone(&payload);
            thread::spawn(move || {
                let mut buf = vec![0u8; payload.len()];
                assert_eq!(input.read_bytes(&mut buf).unwrap(), payload.len());
                assert_eq!(buf, *payload);
                assert!(input.eof().unwrap());
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

#[test]
fn concurrent_writers_on_distinct_files() {
    let dir = Arc::new(RamDirectory::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let dir = Arc::clone(&dir);
            thread::spawn(move || {
                let name = format!("file{i}");
                let mut output = dir.create_output(&name).unwrap();
                output.write_varint32(i).unwrap();
                output.write_string(name.as_bytes()).unwrap();
                output.close();
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }

    let mut names = dir.list_all().unwrap();
    names.sort();
    assert_eq!(names.len(), 8);

    for i in 0..8u32 {
        let name = format!("file{i}");
        let mut input = dir.open_input(&name).unwrap();
        assert_eq!(input.read_varint32().unwrap(), i);
        let mut buf = Vec::new();
        input.read_string(&mut buf).unwrap();
        assert_eq!(buf, name.as_bytes());
    }
}

#[test]
fn delete_segment_is_safe_after_a_failed_multi_file_write() {
    let dir = RamDirectory::new();

    // simulate a multi-file write that completed two files before failing
    for name in ["seg_3.tis", "seg_3.frq"] {
        let mut output = dir.create_output(name).unwrap();
        output.write_string(b"partial segment data").unwrap();
        output.close();
    }
    let mut survivor = dir.create_output("seg_4.tis").unwrap();
    survivor.write_varint32(9).unwrap();
    survivor.close();

    dir.delete_segment("seg_3.");
    let mut names = dir.list_all().unwrap();
    names.sort();
    assert_eq!(names, vec!["seg_4.tis"]);
}
