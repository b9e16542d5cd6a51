// SPDX-License-Identifier: MIT

use alloc::{format, string::String, vec, vec::Vec};

use flatio::prelude::*;

use super::{
    FsChecker, FsCheckerResult, ReachabilityTracker,
    types::{Finding, VerifierOptionsLike, VerifyPhases, VerifyReport},
};
use crate::{
    attr::EntryFlags,
    dir::DirectoryTable,
    fat::FatTable,
    meta::FlatMeta,
    types::{FlatDirEntry, FlatHeader},
    utils::BitmapOps,
};

#[derive(Clone, Debug)]
pub struct FlatCheckOptions {
    pub phases: VerifyPhases,
    pub fail_fast: bool,
    /// Maximum number of orphan blocks listed in the report.
    pub orphan_sample_limit: usize,
}

impl Default for FlatCheckOptions {
    fn default() -> Self {
        Self {
            phases: VerifyPhases::ALL,
            fail_fast: false,
            orphan_sample_limit: 8,
        }
    }
}

impl VerifierOptionsLike for FlatCheckOptions {
    fn phases(&self) -> VerifyPhases {
        self.phases
    }
    fn fail_fast(&self) -> bool {
        self.fail_fast
    }
}

pub struct FlatChecker<'a, IO: BlockIO + ?Sized> {
    io: &'a mut IO,
    meta: &'a FlatMeta,
}

impl<'a, IO: BlockIO + ?Sized> FlatChecker<'a, IO> {
    pub fn new(io: &'a mut IO, meta: &'a FlatMeta) -> Self {
        Self { io, meta }
    }

    fn tables(&mut self) -> FsCheckerResult<(FatTable, DirectoryTable)> {
        let fat = FatTable::read_all(self.io, self.meta)?;
        let dir = DirectoryTable::read_all(self.io, self.meta)?;
        Ok((fat, dir))
    }
}

fn display_name(entry: &FlatDirEntry) -> String {
    String::from_utf8_lossy(entry.name_bytes()).into_owned()
}

impl<IO: BlockIO + ?Sized> FsChecker for FlatChecker<'_, IO> {
    type Options = FlatCheckOptions;

    fn check_header(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let header = FlatHeader::read(self.io)?;
        match header.mismatch(self.meta) {
            Some(field) => rep.push(Finding::err(
                "HDR.FIELD",
                format!("Header field {field} does not match the expected layout"),
            )),
            None => rep.push(Finding::info(
                "HDR.OK",
                format!(
                    "Header OK (size={}, block={}, header={})",
                    header.total_size(),
                    header.block_size(),
                    header.header_size()
                ),
            )),
        }
        Ok(())
    }

    fn check_geometry(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let image_len = self.meta.image_len();
        let mut probe = [0u8; 1];
        if self.io.read_at(image_len - 1, &mut probe).is_err() {
            rep.push(Finding::err(
                "GEO.LEN",
                format!("Container shorter than its layout ({image_len} bytes)"),
            ));
        } else {
            rep.push(Finding::info(
                "GEO.OK",
                format!(
                    "{} blocks, data region at {:#x}",
                    self.meta.block_count, self.meta.data_offset
                ),
            ));
        }
        Ok(())
    }

    fn check_chain(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let (fat, dir) = self.tables()?;
        let mut bad = 0usize;

        for (slot, entry) in dir.scan() {
            let name = display_name(entry);
            match fat.chain(entry.first_block()) {
                Err(e) => {
                    bad += 1;
                    rep.push(Finding::err(
                        "CHN.WALK",
                        format!("{name} (slot {slot}): {e}"),
                    ));
                }
                Ok(chain) => {
                    let expected = self.meta.blocks_for(entry.size() as usize);
                    if chain.len() != expected {
                        bad += 1;
                        rep.push(Finding::err(
                            "CHN.LEN",
                            format!(
                                "{name} (slot {slot}): {} blocks in chain, {expected} expected for {} bytes",
                                chain.len(),
                                entry.size()
                            ),
                        ));
                    }
                }
            }
        }

        if bad == 0 {
            rep.push(Finding::info(
                "CHN.OK",
                format!("{} chains walked", dir.occupied()),
            ));
        }
        Ok(())
    }

    fn check_directory(&mut self, _opt: &Self::Options, rep: &mut VerifyReport) -> FsCheckerResult {
        let dir = DirectoryTable::read_all(self.io, self.meta)?;

        let mut names: Vec<(&[u8], u32)> = Vec::with_capacity(dir.occupied());
        for (slot, entry) in dir.scan() {
            if entry.name_str().is_none() {
                rep.push(Finding::warn(
                    "DIR.UTF8",
                    format!("Slot {slot}: name is not valid UTF-8"),
                ));
            }
            if EntryFlags::from_bits(entry.flags).is_none() {
                rep.push(Finding::warn(
                    "DIR.FLAG",
                    format!("Slot {slot}: unknown flag bits {:#04x}", entry.flags),
                ));
            }
            names.push((entry.name_bytes(), slot));
        }

        names.sort_unstable();
        for pair in names.windows(2) {
            if pair[0].0 == pair[1].0 {
                rep.push(Finding::err(
                    "DIR.DUP",
                    format!(
                        "Slots {} and {} share the name {}",
                        pair[0].1,
                        pair[1].1,
                        String::from_utf8_lossy(pair[0].0)
                    ),
                ));
            }
        }

        rep.push(Finding::info(
            "DIR.SCAN",
            format!("{} of {} slots in use", names.len(), dir.len()),
        ));
        Ok(())
    }

    fn check_cross_reference(
        &mut self,
        opt: &Self::Options,
        rep: &mut VerifyReport,
    ) -> FsCheckerResult {
        let (fat, dir) = self.tables()?;
        let mut tracker = ReachabilityTracker::new(fat.len());

        for (_, entry) in dir.scan() {
            // Broken chains are reported by the chain phase; count what is reachable.
            for block in fat.iter_chain(entry.first_block()).map_while(Result::ok) {
                if !tracker.mark(block) {
                    rep.push(Finding::err(
                        "XREF.SHARED",
                        format!("Block {block} reached again from {}", display_name(entry)),
                    ));
                }
            }
        }

        let mut allocated = vec![0u8; fat.len().div_ceil(8)];
        for (i, &e) in fat.entries().iter().enumerate() {
            allocated.set_bit(i, e != crate::constant::FAT_FREE);
        }

        let orphans = tracker.count_orphans(&allocated);
        if orphans > 0 {
            let mut sample = Vec::new();
            tracker.for_each_orphan(&allocated, opt.orphan_sample_limit, |b| sample.push(b));
            rep.push(Finding::warn(
                "XREF.ORPHAN",
                format!("{orphans} allocated blocks belong to no file (first: {sample:?})"),
            ));
        }

        rep.push(Finding::info(
            "XREF.FREE",
            format!(
                "{} blocks reachable, {} free",
                tracker.marked(),
                fat.free_count()
            ),
        ));
        Ok(())
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;
    use crate::{
        constant::*,
        formatter::{FlatFormatter, FsFormatter},
        utils::FlatName,
        volume::Volume,
    };

    fn fresh() -> (FlatMeta, Vec<u8>) {
        let meta = FlatMeta::new_custom(16 * 512, 512, 64).unwrap();
        let mut buf = vec![0u8; meta.image_len() as usize];
        FlatFormatter::new(&mut MemBlockIO::new(&mut buf), &meta)
            .format(false)
            .unwrap();
        (meta, buf)
    }

    fn check(meta: &FlatMeta, buf: &mut [u8]) -> VerifyReport {
        let mut io = MemBlockIO::new(buf);
        FlatChecker::new(&mut io, meta).check_all().unwrap()
    }

    fn put_entry(meta: &FlatMeta, buf: &mut [u8], slot: u32, name: &str, size: u32, first: u32) {
        let mut io = MemBlockIO::new(buf);
        let mut dir = DirectoryTable::read_all(&mut io, meta).unwrap();
        let entry = FlatDirEntry::new(&FlatName::new(name).unwrap(), size, first);
        dir.write_entry(&mut io, meta, slot, entry).unwrap();
    }

    fn put_fat(meta: &FlatMeta, buf: &mut [u8], block: u32, value: u32) {
        let mut io = MemBlockIO::new(buf);
        io.write_u32_at(meta.fat_entry_offset(block), value).unwrap();
    }

    #[test]
    fn test_healthy_container_is_ok() {
        let (meta, mut buf) = fresh();
        {
            let mut io = MemBlockIO::new(&mut buf);
            let mut vol = Volume::new(&mut io, &meta);
            vol.import("a", &[1u8; 1000]).unwrap();
            vol.import("b", &[]).unwrap();
            vol.import("c", &[2u8; 512]).unwrap();
            vol.remove("a").unwrap();
        }
        let rep = check(&meta, &mut buf);
        assert!(rep.ok(), "{rep}");
        assert!(rep.has_code("HDR.OK"));
        assert!(rep.has_code("CHN.OK"));
        assert!(!rep.has_code("XREF.ORPHAN"));
    }

    #[test]
    fn test_header_mismatch_is_reported() {
        let (meta, mut buf) = fresh();
        MemBlockIO::new(&mut buf).write_u32_at(4, 1024).unwrap();
        let rep = check(&meta, &mut buf);
        assert!(rep.has_code("HDR.FIELD"));
        assert!(rep.first_error().unwrap().contains("block_size"));
    }

    #[test]
    fn test_short_container_is_reported() {
        let (meta, buf) = fresh();
        let mut short = buf[..buf.len() - 1].to_vec();
        let rep = check(&meta, &mut short);
        assert!(rep.has_code("GEO.LEN"));
    }

    #[test]
    fn test_chain_length_mismatch() {
        let (meta, mut buf) = fresh();
        put_entry(&meta, &mut buf, 0, "short", 1500, 0);
        put_fat(&meta, &mut buf, 0, FAT_EOC);
        let rep = check(&meta, &mut buf);
        assert!(rep.has_code("CHN.LEN"));
    }

    #[test]
    fn test_loop_is_reported() {
        let (meta, mut buf) = fresh();
        put_entry(&meta, &mut buf, 0, "loop", 1024, 0);
        put_fat(&meta, &mut buf, 0, 1);
        put_fat(&meta, &mut buf, 1, 0);
        let rep = check(&meta, &mut buf);
        assert!(rep.has_code("CHN.WALK"));
    }

    #[test]
    fn test_shared_block_and_duplicate_name() {
        let (meta, mut buf) = fresh();
        put_entry(&meta, &mut buf, 0, "x", 10, 3);
        put_entry(&meta, &mut buf, 1, "x", 10, 3);
        put_fat(&meta, &mut buf, 3, FAT_EOC);
        let rep = check(&meta, &mut buf);
        assert!(rep.has_code("XREF.SHARED"));
        assert!(rep.has_code("DIR.DUP"));
    }

    #[test]
    fn test_orphan_blocks_warn() {
        let (meta, mut buf) = fresh();
        put_fat(&meta, &mut buf, 5, FAT_EOC);
        let rep = check(&meta, &mut buf);
        assert!(rep.ok());
        let orphan = rep
            .findings
            .iter()
            .find(|f| f.code == "XREF.ORPHAN")
            .unwrap();
        assert!(orphan.msg.contains("[5]"));
    }

    #[test]
    fn test_fail_fast_stops_after_first_failing_phase() {
        let (meta, mut buf) = fresh();
        MemBlockIO::new(&mut buf).write_u32_at(0, 1).unwrap();
        let mut io = MemBlockIO::new(&mut buf);
        let opt = FlatCheckOptions {
            fail_fast: true,
            ..FlatCheckOptions::default()
        };
        let rep = FlatChecker::new(&mut io, &meta).check_with(&opt).unwrap();
        assert!(rep.has_code("HDR.FIELD"));
        assert!(!rep.has_code("GEO.OK"));
    }

    #[test]
    fn test_phase_selection() {
        let (meta, mut buf) = fresh();
        let mut io = MemBlockIO::new(&mut buf);
        let opt = FlatCheckOptions {
            phases: VerifyPhases::DIRECTORY,
            ..FlatCheckOptions::default()
        };
        let rep = FlatChecker::new(&mut io, &meta).check_with(&opt).unwrap();
        assert!(rep.has_code("DIR.SCAN"));
        assert!(!rep.has_code("HDR.OK"));
    }
}
