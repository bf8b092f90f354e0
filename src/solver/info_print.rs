use super::*;
use crate::algebra::*;
use crate::io::{ConfigurablePrintTarget, PrintTarget};
use std::io::Write;
use std::time::Duration;

impl<T> ConfigurablePrintTarget for Info<T> {
    fn print_to_stdout(&mut self) {
        self.stream.print_to_stdout()
    }
    fn print_to_file(&mut self, file: std::fs::File) {
        self.stream.print_to_file(file)
    }
    fn print_to_stream(&mut self, stream: Box<dyn Write + Send + Sync>) {
        self.stream.print_to_stream(stream)
    }
    fn print_to_sink(&mut self) {
        self.stream.print_to_sink()
    }
    fn print_to_buffer(&mut self) {
        self.stream.print_to_buffer()
    }
    fn get_print_buffer(&mut self) -> std::io::Result<String> {
        self.stream.get_print_buffer()
    }
}

macro_rules! expformat {
    ($fmt:expr,$val:expr) => {
        if $val.is_finite() {
            _exp_str_reformat(format!($fmt, $val))
        } else {
            format!($fmt, $val)
        }
    };
}

const RULE: &str = "-----------------------------------------------------------------";

impl<T> Info<T>
where
    T: FloatT,
{
    pub(crate) fn print_banner(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }
        let out = &mut self.stream;

        writeln!(out, "{}", RULE)?;
        writeln!(
            out,
            "          splitqp v{}  -  operator splitting QP solver",
            crate::VERSION
        )?;
        writeln!(out, "{}", RULE)?;
        std::io::Result::Ok(())
    }

    pub(crate) fn print_configuration(
        &mut self,
        settings: &DefaultSettings<T>,
        workspace: &Workspace<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let data = &workspace.data;
        let out = &mut self.stream;

        writeln!(out, "\nproblem:")?;
        writeln!(out, "  variables     = {}", data.n)?;
        writeln!(out, "  constraints   = {}", data.m)?;
        writeln!(out, "  nnz(P)        = {}", data.P.nnz())?;
        writeln!(out, "  nnz(A)        = {}", data.A.nnz())?;
        writeln!(out,)?;

        self.print_settings(settings, &workspace.linsys)?;

        std::io::Result::Ok(())
    }

    fn print_settings(
        &mut self,
        settings: &DefaultSettings<T>,
        linsys: &LinearSystemSolver<T>,
    ) -> std::io::Result<()> {
        let out = &mut self.stream;
        let set = settings;

        writeln!(out, "settings:")?;

        write!(out, "  linear algebra: ")?;
        if linsys.is_direct() {
            write!(out, "direct / {}, ", linsys.name())?;
        } else {
            write!(out, "indirect / {}, ", linsys.name())?;
        }
        write!(out, "precision: {} bit ", _get_precision_string::<T>())?;
        print_nthreads(out, linsys.nthreads())?;
        writeln!(out)?;

        let time_lim_str = {
            if set.time_limit.is_infinite() {
                "Inf".to_string()
            } else {
                format!("{:?}", set.time_limit)
            }
        };
        writeln!(
            out,
            "  max iter = {}, time limit = {}, check termination = {}",
            set.max_iter, time_lim_str, set.check_termination
        )?;

        writeln!(
            out,
            "  eps_abs = {:.1e}, eps_rel = {:.1e},",
            set.eps_abs, set.eps_rel
        )?;
        writeln!(
            out,
            "  eps_prim_inf = {:.1e}, eps_dual_inf = {:.1e},",
            set.eps_prim_inf, set.eps_dual_inf
        )?;

        writeln!(
            out,
            "  rho = {:.2e}, sigma = {:.2e}, alpha = {:.2},",
            set.rho, set.sigma, set.alpha
        )?;

        write!(out, "  adaptive rho: {}", _bool_on_off(set.adaptive_rho))?;
        if set.adaptive_rho {
            write!(
                out,
                ", interval = {}, tolerance = {:.1}",
                set.adaptive_rho_interval, set.adaptive_rho_tolerance
            )?;
        }
        writeln!(out)?;

        writeln!(
            out,
            "  scaling: {} ({} iterations), scaled termination: {}",
            _bool_on_off(set.scaling > 0),
            set.scaling,
            _bool_on_off(set.scaled_termination)
        )?;

        writeln!(
            out,
            "  warm start: {}, polish: {}, termination norm: {:?}",
            _bool_on_off(set.warm_start),
            _bool_on_off(set.polish),
            set.termination_norm
        )?;

        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    pub(crate) fn print_status_header(
        &mut self,
        settings: &DefaultSettings<T>,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        write!(out, "iter   ")?;
        write!(out, "objective    ")?;
        write!(out, "prim res   ")?;
        write!(out, "dual res   ")?;
        write!(out, "rho        ")?;
        write!(out, "time")?;
        writeln!(out,)?;
        writeln!(out, "{}", RULE)?;
        out.flush()?;
        std::io::Result::Ok(())
    }

    pub(crate) fn print_status(
        &mut self,
        settings: &DefaultSettings<T>,
        rho: T,
        elapsed: Duration,
    ) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        write!(out, "{:>4}  ", self.iterations)?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.obj_val))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.pri_res))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.dua_res))?;
        write!(out, "{}  ", expformat!("{:6.2e}", rho))?;
        write!(out, "{:.2e}s", elapsed.as_secs_f64())?;
        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    pub(crate) fn print_polish(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        write!(out, "plsh  ")?;
        write!(out, "{}  ", expformat!("{:+8.4e}", self.obj_val))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.pri_res))?;
        write!(out, "{}  ", expformat!("{:6.2e}", self.dua_res))?;
        write!(out, "  -------   ")?;
        write!(out, "{:.2e}s", self.polish_time)?;
        writeln!(out,)?;

        std::io::Result::Ok(())
    }

    pub(crate) fn print_footer(&mut self, settings: &DefaultSettings<T>) -> std::io::Result<()> {
        if !settings.verbose {
            return std::io::Result::Ok(());
        }

        let out = &mut self.stream;

        writeln!(out, "{}", RULE)?;
        writeln!(out, "status               : {}", self.status)?;
        if settings.polish {
            writeln!(out, "solution polishing   : {}", self.status_polish)?;
        }
        writeln!(out, "number of iterations : {}", self.iterations)?;
        if self.status.is_solved() {
            writeln!(
                out,
                "optimal objective    : {}",
                expformat!("{:.4e}", self.obj_val)
            )?;
        }
        if self.rho_updates > 0 {
            writeln!(out, "rho updates          : {}", self.rho_updates)?;
            writeln!(
                out,
                "optimal rho estimate : {}",
                expformat!("{:.2e}", self.rho_estimate)
            )?;
        }
        writeln!(
            out,
            "run time             : {:?}",
            Duration::from_secs_f64(self.run_time)
        )?;
        out.flush()?;

        std::io::Result::Ok(())
    }
}

fn _bool_on_off(v: bool) -> &'static str {
    match v {
        true => "on",
        false => "off",
    }
}

fn print_nthreads(out: &mut PrintTarget, nthreads: usize) -> std::io::Result<()> {
    match nthreads {
        0 => Ok(()),
        1 => write!(out, "(1 thread)"),
        _ => write!(out, "({nthreads} threads)"),
    }
}

fn _get_precision_string<T: FloatT>() -> String {
    (::std::mem::size_of::<T>() * 8).to_string()
}

// convert a string in LowerExp display format into one that
// 1) always has a sign after the exponent, and
// 2) has at least two digits in the exponent.

fn _exp_str_reformat(mut thestr: String) -> String {
    // Safe to `unwrap` as `num` is guaranteed to contain `'e'`
    let eidx = thestr.find('e').unwrap();
    let has_sign = thestr.chars().nth(eidx + 1).unwrap() == '-';

    let has_short_exp = {
        if !has_sign {
            thestr.len() == eidx + 2
        } else {
            thestr.len() == eidx + 3
        }
    };

    let chars;
    if !has_sign {
        if has_short_exp {
            chars = "+0";
        } else {
            chars = "+";
        }
    } else if has_short_exp {
        chars = "0";
    } else {
        chars = "";
    }

    let shift = if has_sign { 2 } else { 1 };
    thestr.insert_str(eidx + shift, chars);
    thestr
}

#[test]
fn test_exp_str_reformat() {
    assert_eq!(_exp_str_reformat("1.5e3".to_string()), "1.5e+03");
    assert_eq!(_exp_str_reformat("1.5e-3".to_string()), "1.5e-03");
    assert_eq!(_exp_str_reformat("-2.0e-12".to_string()), "-2.0e-12");
    assert_eq!(_exp_str_reformat("2.0e100".to_string()), "2.0e+100");
}
