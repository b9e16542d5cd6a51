// SPDX-License-Identifier: MIT

use std::path::{Path, PathBuf};

use flatfs::prelude::*;
use tempfile::TempDir;

const SIX_MIB: u64 = 6 * 1024 * 1024;

fn container() -> (TempDir, PathBuf, FlatFs) {
    let dir = tempfile::tempdir().expect("tempdir failed");
    let path = dir.path().join("container.img");
    let fs = FlatFs::create(&path, SIX_MIB).expect("create failed");
    (dir, path, fs)
}

fn payload(len: usize, seed: u8) -> Vec<u8> {
    (0..len)
        .map(|i| (i as u8).wrapping_mul(13).wrapping_add(seed))
        .collect()
}

fn raw_fat_entry(path: &Path, meta: &FlatMeta, block: u32) -> u32 {
    let bytes = std::fs::read(path).unwrap();
    let off = meta.fat_entry_offset(block) as usize;
    u32::from_le_bytes(bytes[off..off + 4].try_into().unwrap())
}

#[test]
fn test_a_txt_scenario_on_disk() {
    let (_dir, path, fs) = container();
    let meta = *fs.meta();
    assert_eq!(meta.block_count(), 12288);

    let data = payload(1000, 1);
    let entry = fs.copy_in(&data, "a.txt").unwrap();
    assert_eq!(entry.slot, 0);
    assert_eq!(entry.size, 1000);
    assert_eq!(entry.first_block, 0);

    assert_eq!(raw_fat_entry(&path, &meta, 0), 1);
    assert_eq!(raw_fat_entry(&path, &meta, 1), FAT_EOC);
    assert_eq!(fs.copy_out("a.txt").unwrap(), data);

    fs.remove("a.txt").unwrap();
    assert_eq!(raw_fat_entry(&path, &meta, 0), FAT_FREE);
    assert_eq!(raw_fat_entry(&path, &meta, 1), FAT_FREE);

    let bytes = std::fs::read(&path).unwrap();
    let slot0 = meta.dir_entry_offset(0) as usize;
    assert_eq!(bytes[slot0], 0x00);
    assert!(bytes[slot0..slot0 + DIR_ENTRY_SIZE].iter().all(|&b| b == 0));
}

#[test]
fn test_roundtrip_sizes_across_block_boundaries() {
    let (_dir, _path, fs) = container();
    let sizes = [0usize, 1, 511, 512, 513, 4096, 100_000];

    for (i, &len) in sizes.iter().enumerate() {
        fs.copy_in(&payload(len, i as u8), &format!("f{len}")).unwrap();
    }
    for (i, &len) in sizes.iter().enumerate() {
        assert_eq!(fs.copy_out(&format!("f{len}")).unwrap(), payload(len, i as u8));
    }
    assert!(fs.check().unwrap().ok());
}

#[test]
fn test_free_space_tracks_import_and_delete() {
    let (_dir, _path, fs) = container();
    let (free0, total) = fs.free_space().unwrap();
    assert_eq!(total, SIX_MIB);

    fs.copy_in(&payload(5000, 0), "five").unwrap();
    let (free1, _) = fs.free_space().unwrap();
    assert_eq!(free0 - free1, 10 * 512);

    fs.remove("five").unwrap();
    assert_eq!(fs.free_space().unwrap().0, free0);
}

#[test]
fn test_listing_is_slot_ordered_without_gaps() {
    let (_dir, _path, fs) = container();
    for name in ["one", "two", "three", "four"] {
        fs.copy_in(name.as_bytes(), name).unwrap();
    }
    fs.remove("two").unwrap();
    fs.copy_in(b"5", "five").unwrap();

    assert_eq!(fs.list_files().unwrap(), vec!["one", "five", "three", "four"]);

    let slots: Vec<u32> = fs.entries().unwrap().iter().map(|e| e.slot).collect();
    assert_eq!(slots, vec![0, 1, 2, 3]);
}

#[test]
fn test_rename_then_export() {
    let (_dir, _path, fs) = container();
    let data = payload(2048, 9);
    fs.copy_in(&data, "draft.txt").unwrap();

    fs.rename("draft.txt", "final.txt").unwrap();
    assert_eq!(fs.list_files().unwrap(), vec!["final.txt"]);
    assert_eq!(fs.stat("final.txt").unwrap().size, 2048);
    assert_eq!(fs.copy_out("final.txt").unwrap(), data);
}

#[test]
fn test_protect_survives_reopen() {
    let (_dir, path, fs) = container();
    fs.copy_in(b"locked", "lock").unwrap();
    fs.set_protected("lock", true).unwrap();
    drop(fs);

    let fs = FlatFs::open(&path, SIX_MIB).unwrap();
    assert!(fs.stat("lock").unwrap().protected);
    assert_eq!(
        fs.remove("lock").unwrap_err(),
        FsError::Directory(FsDirectoryError::Protected)
    );

    fs.set_protected("lock", false).unwrap();
    fs.remove("lock").unwrap();
}

#[test]
fn test_insufficient_space_leaves_container_bytes_unchanged() {
    let (_dir, path, fs) = container();
    fs.copy_in(&payload(700, 3), "small").unwrap();

    let (free, _) = fs.free_space().unwrap();
    let before = std::fs::read(&path).unwrap();

    let err = fs
        .copy_in(&payload(free as usize + 1, 4), "huge")
        .unwrap_err();
    assert!(err.is_insufficient_space());
    assert_eq!(std::fs::read(&path).unwrap(), before);
}

#[test]
fn test_host_file_import_export() {
    let (dir, _path, fs) = container();
    let src = dir.path().join("src.bin");
    let dest = dir.path().join("dest.bin");
    let data = payload(3000, 5);
    std::fs::write(&src, &data).unwrap();

    fs.import_file(&src, "src.bin").unwrap();
    assert_eq!(fs.export_file("src.bin", &dest).unwrap(), 3000);
    assert_eq!(std::fs::read(&dest).unwrap(), data);

    assert!(fs.export_file("missing", &dest).unwrap_err().is_not_found());
}

#[test]
fn test_io_counter_sees_no_writes_on_rejected_import() {
    let meta = FlatMeta::new(SIX_MIB).unwrap();
    let mut buf = vec![0u8; meta.image_len() as usize];
    let mut mem = MemBlockIO::new(&mut buf);
    FlatFormatter::new(&mut mem, &meta).format(false).unwrap();

    let mut io = IOCounter::new(&mut mem);
    let mut vol = Volume::new(&mut io, &meta);
    vol.import("dup", b"x").unwrap();
    let after_first = io.snapshot().writes;

    let mut vol = Volume::new(&mut io, &meta);
    assert!(vol.import("dup", b"y").is_err());
    assert!(vol.import(&"n".repeat(51), b"y").is_err());
    assert_eq!(io.snapshot().writes, after_first);
}
