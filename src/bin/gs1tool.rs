//! Convert GS1 AI data between representations.
//!
//! Usage:
//!   gs1tool [OPTIONS] DATA...
//!   gs1tool [OPTIONS] < file        (one input per line)
//!
//! The input representation is detected from its shape: `(...` bracketed
//! AI data, `^...` raw data with FNC1 as `^`, `http(s)://...` Digital
//! Link URI, `]...` barcode scan data; anything else is plain data.
//!
//! Options:
//!   --sym NUM          symbology number (0-14) used for scan data output
//!   --scan             also print scan data for the selected symbology
//!   --dl               also print a Digital Link URI
//!   --stem URI         stem for Digital Link output (implies --dl)
//!   --titles, -t       include data titles in HRI
//!   --permit-unknown   permit unknown AIs
//!   --add-check-digit  primary data is given without its check digit

use anyhow::{anyhow, bail, Context};
use gs1syntax::{Gs1Encoder, Symbology};
use std::io::{self, BufRead};

struct Options {
    scan: bool,
    dl: bool,
    stem: Option<String>,
    inputs: Vec<String>,
}

fn parse_args(enc: &mut Gs1Encoder) -> anyhow::Result<Options> {
    let mut opts = Options { scan: false, dl: false, stem: None, inputs: Vec::new() };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--sym" => {
                let num = args.next().context("--sym requires a number")?;
                let num: i32 = num.parse().with_context(|| format!("bad symbology: {}", num))?;
                enc.set_sym(Symbology::try_from(num)?);
            }
            "--scan" => opts.scan = true,
            "--dl" => opts.dl = true,
            "--stem" => {
                opts.stem = Some(args.next().context("--stem requires a URI")?);
                opts.dl = true;
            }
            "--titles" | "-t" => enc.set_include_data_titles_in_hri(true),
            "--permit-unknown" => enc.set_permit_unknown_ais(true),
            "--add-check-digit" => enc.set_add_check_digit(true),
            "--help" | "-h" => {
                print!("{}", USAGE);
                std::process::exit(0);
            }
            _ if arg.starts_with("--") => bail!("unknown option: {}", arg),
            _ => opts.inputs.push(arg),
        }
    }

    Ok(opts)
}

const USAGE: &str = "\
Usage: gs1tool [OPTIONS] DATA...

Options:
  --sym NUM          symbology number (0-14) used for scan data output
  --scan             also print scan data for the selected symbology
  --dl               also print a Digital Link URI
  --stem URI         stem for Digital Link output (implies --dl)
  --titles, -t       include data titles in HRI
  --permit-unknown   permit unknown AIs
  --add-check-digit  primary data is given without its check digit
";

fn set_input(enc: &mut Gs1Encoder, input: &str) -> anyhow::Result<()> {
    let result = if input.starts_with('(') {
        enc.set_ai_data_str(input)
    } else if input.starts_with(']') {
        enc.set_scan_data(input)
    } else {
        enc.set_data_str(input)
    };

    result.map_err(|_| {
        let mut msg = enc.err_msg().to_string();
        if !enc.err_markup().is_empty() {
            msg = format!("{}: {}", msg, enc.err_markup());
        }
        anyhow!(msg)
    })
}

fn convert(enc: &mut Gs1Encoder, opts: &Options, input: &str) -> anyhow::Result<()> {
    set_input(enc, input)?;

    if let Some(ai_data) = enc.ai_data_str() {
        println!("AI element string:  {}", ai_data);
    }
    println!("Data string:        {}", enc.data_str());
    for line in enc.hri() {
        println!("HRI:                {}", line);
    }
    for param in enc.dl_ignored_query_params() {
        println!("Ignored DL param:   {}", param);
    }
    if opts.dl {
        match enc.dl_uri(opts.stem.as_deref()) {
            Ok(uri) => println!("Digital Link URI:   {}", uri),
            Err(err) => eprintln!("Digital Link URI:   {}", err),
        }
    }
    if opts.scan {
        match enc.scan_data() {
            Ok(data) => println!("Scan data:          {}", data),
            Err(err) => eprintln!("Scan data:          {}", err),
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let mut enc = Gs1Encoder::new();
    let opts = parse_args(&mut enc)?;

    let mut failed = false;

    if opts.inputs.is_empty() {
        for line in io::stdin().lock().lines() {
            let line = line?;
            if line.is_empty() {
                continue;
            }
            if let Err(err) = convert(&mut enc, &opts, &line) {
                eprintln!("{}: {}", line, err);
                failed = true;
            }
        }
    } else {
        for input in &opts.inputs {
            if let Err(err) = convert(&mut enc, &opts, input) {
                eprintln!("{}: {}", input, err);
                failed = true;
            }
        }
    }

    if failed {
        std::process::exit(1);
    }
    Ok(())
}
