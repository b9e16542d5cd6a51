// SPDX-License-Identifier: MIT

mod flat;
mod tracker;
mod types;

pub use flat::{FlatCheckOptions, FlatChecker};
pub use tracker::ReachabilityTracker;
pub use types::{
    Finding, ReportDisplay, ReportDisplayOpts, Severity, VerifierOptionsLike, VerifyPhases,
    VerifyReport,
};

pub use crate::errors::{FsCheckerError, FsCheckerResult};

/// Consistency checks over a container, split into phases.
///
/// Each phase pushes findings into the report; an `Err` is reserved for
/// failures that stop the check itself, such as unreadable regions.
pub trait FsChecker: Sized {
    type Options: VerifierOptionsLike + Default;

    fn check_with(&mut self, opt: &Self::Options) -> FsCheckerResult<VerifyReport> {
        let mut rep = VerifyReport::default();
        let phases: [(VerifyPhases, PhaseFn<Self>); 5] = [
            (VerifyPhases::HEADER, Self::check_header),
            (VerifyPhases::GEOMETRY, Self::check_geometry),
            (VerifyPhases::CHAIN, Self::check_chain),
            (VerifyPhases::DIRECTORY, Self::check_directory),
            (VerifyPhases::CROSSREF, Self::check_cross_reference),
        ];
        for (phase, f) in phases {
            if self.run_phase(opt, &mut rep, phase, f)? {
                break;
            }
        }
        Ok(rep)
    }

    fn check_all(&mut self) -> FsCheckerResult<VerifyReport> {
        self.check_with(&Self::Options::default())
    }

    fn check_header(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult {
        Ok(())
    }

    fn check_geometry(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult {
        Ok(())
    }

    fn check_chain(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult {
        Ok(())
    }

    fn check_directory(&mut self, _opt: &Self::Options, _rep: &mut VerifyReport) -> FsCheckerResult {
        Ok(())
    }

    fn check_cross_reference(
        &mut self,
        _opt: &Self::Options,
        _rep: &mut VerifyReport,
    ) -> FsCheckerResult {
        Ok(())
    }

    /// Runs `f` if `phase` is enabled. Returns `true` when the check should stop
    /// (fail-fast with an error recorded).
    fn run_phase(
        &mut self,
        opt: &Self::Options,
        rep: &mut VerifyReport,
        phase: VerifyPhases,
        f: PhaseFn<Self>,
    ) -> FsCheckerResult<bool> {
        if !opt.phases().contains(phase) {
            return Ok(false);
        }
        f(self, opt, rep)?;
        Ok(opt.fail_fast() && rep.has_error())
    }
}

/// Signature shared by every phase method.
pub type PhaseFn<C> =
    fn(&mut C, &<C as FsChecker>::Options, &mut VerifyReport) -> FsCheckerResult;
