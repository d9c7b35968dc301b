use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context as _, Result};
use clap::{ArgAction, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use mpkernel::{Context, Float128, Float256, Integer};
use num_traits::One;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use rug::{float::Constant, Complete, Float};
use tracing::{debug, info, instrument};
use tracing_chrome::{ChromeLayerBuilder, FlushGuard};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;

const A: u64 = 13_591_409;
const B: u64 = 545_140_134;
const C: u64 = 640_320;
const D: u64 = 12;

const DIGITS_PER_ITER: f64 = 14.181_647_462_725_477;
const BITS_PER_DIGIT: f64 = 3.321_928_094_887_362;

/// Decimal digits carried past the requested count until the final truncation.
const GUARD_DIGITS: usize = 8;

type Pqg = (Integer, Integer, Integer);

#[derive(Debug, Parser)]
#[command(name = "mpkernel", about = "Exercise the multiprecision kernels")]
struct Cli {
    /// Log more; repeat for debug and trace output
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Write a Chrome trace of the run to this file
    #[arg(long, global = true)]
    trace: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Digits of pi by Chudnovsky binary splitting
    Pi {
        /// Digits after the decimal point; underscores are ignored
        #[arg(default_value_t = 60, value_parser = parse_count)]
        digits: usize,

        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Compare the result with GMP
        #[arg(long)]
        verify: bool,
    },
    /// n! as a parallel product tree
    Factorial {
        #[arg(value_parser = parse_count)]
        n: usize,

        #[arg(short, long, default_value_t = 1)]
        threads: usize,

        /// Compare the result with GMP
        #[arg(long)]
        verify: bool,
    },
    /// Square root in a double-double, or quad-double with --quad
    Sqrt {
        value: String,

        #[arg(long)]
        quad: bool,

        /// Significant digits to print
        #[arg(short, long)]
        digits: Option<usize>,
    },
}

fn parse_count(s: &str) -> std::result::Result<usize, std::num::ParseIntError> {
    s.replace('_', "").parse()
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let _guard = init_tracing(cli.verbose, cli.trace.as_deref());

    match cli.command {
        Command::Pi {
            digits,
            threads,
            verify,
        } => {
            let start = Instant::now();
            let progress = progress_bar();
            let pi = chudnovsky(digits, threads, &progress)?;
            progress.finish_and_clear();
            info!(digits, threads, elapsed = ?start.elapsed(), "computed pi");
            if verify {
                verify_pi(digits, &pi)?;
                info!("pi matches GMP");
            }
            println!("{pi}");
        }
        Command::Factorial { n, threads, verify } => {
            let start = Instant::now();
            let progress = progress_bar();
            let value = factorial(n, threads, &progress)?;
            progress.finish_and_clear();
            let text = value.to_string();
            info!(n, threads, elapsed = ?start.elapsed(), len = text.len(), "computed factorial");
            if verify {
                verify_factorial(n, &text)?;
                info!("factorial matches GMP");
            }
            println!("{text}");
        }
        Command::Sqrt {
            value,
            quad,
            digits,
        } => println!("{}", composite_sqrt(&value, quad, digits)?),
    }

    Ok(())
}

fn init_tracing(verbose: u8, trace: Option<&Path>) -> Option<FlushGuard> {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let (chrome, guard) = match trace {
        Some(path) => {
            let (layer, guard) = ChromeLayerBuilder::new().file(path).build();
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };
    tracing_subscriber::registry()
        .with(chrome)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_filter(level),
        )
        .init();
    guard
}

fn progress_bar() -> ProgressBar {
    let bar = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}") {
        bar.set_style(style);
    }
    bar
}

/// Folds `arr` pairwise as a balanced tree, halves in parallel.
fn reduce<T: Default + Send>(arr: &mut [T], merge: &(impl Fn(T, T) -> T + Sync)) -> T {
    match arr.len() {
        0 => T::default(),
        1 => std::mem::take(&mut arr[0]),
        2 => {
            let a = std::mem::take(&mut arr[0]);
            let b = std::mem::take(&mut arr[1]);
            merge(a, b)
        }
        n => {
            let mid = n / 2;
            let (start, end) = arr.split_at_mut(mid);
            let (a, b) = rayon::join(|| reduce(start, merge), || reduce(end, merge));

            merge(a, b)
        }
    }
}

fn merge(a: Pqg, b: Pqg) -> Pqg {
    let (mut p, mut q, mut g) = a;
    let (in_p, in_q, in_g) = b;

    p *= &in_p;
    q *= in_p;
    q += in_q * &g;

    g *= in_g;

    (p, q, g)
}

/// `pi` to `num_digits` decimals as `"3.1415..."`, truncated.
#[instrument(skip(progress))]
fn chudnovsky(num_digits: usize, threads: usize, progress: &ProgressBar) -> Result<String> {
    let iters_needed = (num_digits as f64 / DIGITS_PER_ITER) as usize + 2;
    let threads = threads.clamp(1, iters_needed);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .use_current_thread()
        .build()?;

    let mut depth = 0;
    while 1 << depth < iters_needed {
        depth += 1;
    }
    depth += 2;

    let iters_per_thread = iters_needed / threads;
    progress.set_length(threads as u64);
    progress.set_message("splitting");

    let mut parts = pool.install(|| {
        (0..threads)
            .into_par_iter()
            .map(|i| {
                let from = i * iters_per_thread;
                let to = if i < threads - 1 {
                    from + iters_per_thread
                } else {
                    iters_needed
                };
                let part = CoreSplitter::new(depth).binary_split(from, to);
                progress.inc(1);
                part
            })
            .collect::<mpkernel::Result<Vec<Pqg>>>()
    })?;
    debug!(iters_needed, "done splitting");

    progress.set_message("summing");
    let (mut p, mut q, _) = pool.install(|| reduce(&mut parts, &merge));

    //       p * (C / D) * sqrt(C)
    // pi = -----------------------
    //           q + A * p
    q += &p * A;
    p *= C / D;

    progress.set_message("square root");
    let scale = num_digits + GUARD_DIGITS;
    let mut radicand = Integer::from_u128(10)?.checked_pow(2 * scale as u64)?;
    radicand *= C;
    let sqrt_c = radicand.checked_sqrt()?;

    progress.set_message("dividing");
    let pi = (p * sqrt_c).checked_div(&q)?;

    let mut s = pi.to_string();
    s.truncate(1 + num_digits);
    s.insert(1, '.');

    Ok(s)
}

struct CoreSplitter {
    p_stack: Vec<Integer>,
    q_stack: Vec<Integer>,
    g_stack: Vec<Integer>,
}

impl CoreSplitter {
    fn new(depth: usize) -> Self {
        Self {
            p_stack: vec![Integer::default(); depth],
            q_stack: vec![Integer::default(); depth],
            g_stack: vec![Integer::default(); depth],
        }
    }

    fn binary_split(mut self, from: usize, to: usize) -> mpkernel::Result<Pqg> {
        self.split(from, to, 0)?;
        let p = self.p_stack.swap_remove(0);
        let q = self.q_stack.swap_remove(0);
        let g = self.g_stack.swap_remove(0);

        Ok((p, q, g))
    }

    fn split(&mut self, a: usize, b: usize, top: usize) -> mpkernel::Result<()> {
        if b - a == 1 {
            // g(b-1,b) = (6b-5)(2b-1)(6b-1)
            // p(b-1,b) = b^3 * C^3 / 24
            // q(b-1,b) = (-1)^b * g(b-1,b) * (A+Bb)
            let b = b as u64;
            let p1 = &mut self.p_stack[top];
            let q1 = &mut self.q_stack[top];
            let g1 = &mut self.g_stack[top];

            *p1 = Integer::from_u128(b.into())?.checked_pow(3)?;
            *p1 *= (C / 24) * (C / 24);
            *p1 *= C * 24;

            *g1 = Integer::from_u128((2 * b - 1).into())?;
            *g1 *= 6 * b - 1;
            *g1 *= 6 * b - 5;

            *q1 = Integer::from_u128(b.into())?;
            *q1 *= B;
            *q1 += A;
            *q1 *= &*g1;

            if b % 2 == 1 {
                *q1 = -std::mem::take(q1);
            }
        } else {
            // p(a,b) = p(a,m) * p(m,b)
            // q(a,b) = q(a,m) * p(m,b) + q(m,b) * g(a,m)
            // g(a,b) = g(a,m) * g(m,b)
            let m = (a as f32 + (b as f32 - a as f32) * 0.5224) as usize;

            self.split(a, m, top)?;
            self.split(m, b, top + 1)?;

            let (p_am, p_mb) = pair(&mut self.p_stack, top);
            let (g_am, g_mb) = pair(&mut self.g_stack, top);
            let (q_am, q_mb) = pair(&mut self.q_stack, top);

            *p_am *= &*p_mb;

            *q_am *= &*p_mb;
            *q_am += &*q_mb * &*g_am;
            *g_am *= &*g_mb;
        }
        Ok(())
    }
}

fn pair(stack: &mut [Integer], top: usize) -> (&mut Integer, &mut Integer) {
    let (lo, hi) = stack.split_at_mut(top + 1);
    (&mut lo[top], &mut hi[0])
}

fn product(a: Integer, b: Integer) -> Integer {
    a * b
}

/// `n!` from per-thread partial products.
#[instrument(skip(progress))]
fn factorial(n: usize, threads: usize, progress: &ProgressBar) -> Result<Integer> {
    let threads = threads.clamp(1, n.max(1));
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .use_current_thread()
        .build()?;

    let chunk = n.div_ceil(threads).max(1);
    progress.set_length(threads as u64);
    progress.set_message("multiplying");

    let mut parts = pool.install(|| {
        (0..threads)
            .into_par_iter()
            .map(|i| {
                let from = i * chunk + 1;
                let to = ((i + 1) * chunk).min(n);
                let mut factors = (from..=to)
                    .map(|k| Integer::from_u128(k as u128))
                    .collect::<mpkernel::Result<Vec<_>>>()?;
                let part = if factors.is_empty() {
                    Integer::one()
                } else {
                    reduce(&mut factors, &product)
                };
                progress.inc(1);
                Ok::<_, mpkernel::Error>(part)
            })
            .collect::<mpkernel::Result<Vec<Integer>>>()
    })?;

    Ok(pool.install(|| reduce(&mut parts, &product)))
}

#[instrument]
fn composite_sqrt(value: &str, quad: bool, digits: Option<usize>) -> Result<String> {
    let mut ctx = Context::new();
    ctx.set_precision(digits);

    let text = if quad {
        let x: Float256 = value.parse().context("invalid value")?;
        x.sqrt().to_string_ctx(&ctx)
    } else {
        let x: Float128 = value.parse().context("invalid value")?;
        x.sqrt().to_string_ctx(&ctx)
    };
    Ok(text)
}

fn verify_pi(digits: usize, ours: &str) -> Result<()> {
    let prec = (digits as f64 * BITS_PER_DIGIT) as u32 + 64;
    let mut pi = Float::with_val(prec, Constant::Pi);
    pi *= rug::Integer::u_pow_u(10, digits as u32).complete();
    pi.floor_mut();
    let expected = pi
        .to_integer()
        .context("pi is finite")?
        .to_string();

    let ours: String = ours.chars().filter(char::is_ascii_digit).collect();
    if let Some(pos) = ours.chars().zip(expected.chars()).position(|(a, b)| a != b) {
        bail!("pi differs from GMP at digit {pos}");
    }
    if ours.len() != expected.len() {
        bail!("pi has {} digits, GMP has {}", ours.len(), expected.len());
    }
    Ok(())
}

fn verify_factorial(n: usize, ours: &str) -> Result<()> {
    let n = u32::try_from(n).context("n too large for GMP factorial")?;
    let expected = rug::Integer::factorial(n).complete().to_string();
    if ours != expected {
        bail!("{n}! differs from GMP");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn last_10(s: &str) -> &str {
        &s[s.len() - 10..]
    }

    #[test]
    fn verify_last_10_digits() {
        // http://www.numberworld.org/digits/Pi/
        for (digits, expected_last_10) in [
            (100, "3421170679"),
            (1_000, "2164201989"),
            (10_000, "5256375678"),
        ] {
            let pi = chudnovsky(digits, 1, &ProgressBar::hidden()).unwrap();
            assert_eq!(pi.len(), digits + 2);
            assert_eq!(
                last_10(&pi),
                expected_last_10,
                "testing {digits} digits of pi (right = expected)"
            );
        }
    }

    #[test]
    fn verify_multithreaded() {
        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(4);

        let pi = chudnovsky(1_000, threads, &ProgressBar::hidden()).unwrap();
        assert_eq!(last_10(&pi), "2164201989");
        verify_pi(1_000, &pi).unwrap();
    }

    #[test]
    fn short_pi() {
        let pi = chudnovsky(50, 1, &ProgressBar::hidden()).unwrap();
        assert_eq!(pi, "3.14159265358979323846264338327950288419716939937510");
    }

    #[test]
    fn factorial_matches_gmp() {
        for (n, threads) in [(0, 1), (1, 3), (30, 1), (1_000, 4), (1_001, 7)] {
            let value = factorial(n, threads, &ProgressBar::hidden()).unwrap();
            verify_factorial(n, &value.to_string()).unwrap();
        }
        let value = factorial(30, 2, &ProgressBar::hidden()).unwrap();
        assert_eq!(value.to_string(), "265252859812191058636308480000000");
    }

    #[test]
    fn composite_square_roots() {
        assert_eq!(
            composite_sqrt("2", false, Some(20)).unwrap(),
            "1.4142135623730950488"
        );
        let quad = composite_sqrt("2", true, Some(60)).unwrap();
        assert!(quad.starts_with("1.4142135623730950488016887242096980785696718753769480"));
        assert!(composite_sqrt("two", false, None).is_err());
    }

    #[test]
    fn counts_accept_underscores() {
        assert_eq!(parse_count("1_000_000"), Ok(1_000_000));
        assert!(parse_count("1e6").is_err());
    }
}
