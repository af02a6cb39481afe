//! CLI argument parsing

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Scan(ScanArgs),
    Report(ReportArgs),
}

#[derive(Debug, Clone)]
pub struct ScanArgs {
    pub location: String,
    pub store_root: Option<String>,
    pub extractor: String,
    pub granularity: Option<String>,
    pub workers: Option<usize>,
    pub report: Option<String>,
    pub json: bool,
    pub quiet: bool,
}

#[derive(Debug, Clone)]
pub struct ReportArgs {
    pub from_report: String,
    pub json: bool,
}

impl Default for ScanArgs {
    fn default() -> Self {
        Self {
            location: String::new(),
            store_root: None,
            extractor: "literal".to_string(),
            granularity: None,
            workers: None,
            report: None,
            json: false,
            quiet: false,
        }
    }
}

/// Parse command line arguments
pub fn parse_args(args: &[String]) -> Result<CliArgs, String> {
    if args.len() < 2 {
        return Err("No command specified".to_string());
    }

    let command = match args[1].as_str() {
        "scan" => Command::Scan(parse_scan_args(&args[2..])?),
        "report" => Command::Report(parse_report_args(&args[2..])?),
        _ => return Err(format!("Unknown command: {}", args[1])),
    };

    Ok(CliArgs { command })
}

fn take_value<'a>(args: &'a [String], i: &mut usize, flag: &str, what: &str) -> Result<&'a str, String> {
    *i += 1;
    args.get(*i)
        .map(String::as_str)
        .ok_or_else(|| format!("{flag} requires {what}"))
}

fn parse_scan_args(args: &[String]) -> Result<ScanArgs, String> {
    let mut scan_args = ScanArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--store-root" => {
                let value = take_value(args, &mut i, "--store-root", "a directory")?;
                scan_args.store_root = Some(value.to_string());
            }
            "--extractor" => {
                let value = take_value(args, &mut i, "--extractor", "a value")?;
                scan_args.extractor = value.to_string();
            }
            "--granularity" => {
                let value = take_value(args, &mut i, "--granularity", "a value")?;
                scan_args.granularity = Some(value.to_string());
            }
            "--workers" => {
                let value = take_value(args, &mut i, "--workers", "a value")?;
                let workers: usize = value
                    .parse()
                    .map_err(|_| "--workers must be a positive integer".to_string())?;
                if workers == 0 {
                    return Err("--workers must be greater than zero".to_string());
                }
                scan_args.workers = Some(workers);
            }
            "--report" => {
                let value = take_value(args, &mut i, "--report", "a file path")?;
                scan_args.report = Some(value.to_string());
            }
            "--json" => {
                scan_args.json = true;
            }
            "--quiet" => {
                scan_args.quiet = true;
            }
            arg if !arg.starts_with("--") => {
                if scan_args.location.is_empty() {
                    scan_args.location = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if scan_args.location.is_empty() {
        return Err("Missing required argument: LOCATION".to_string());
    }

    Ok(scan_args)
}

fn parse_report_args(args: &[String]) -> Result<ReportArgs, String> {
    let mut from_report = String::new();
    let mut json = false;

    for arg in args {
        match arg.as_str() {
            "--json" => json = true,
            arg if !arg.starts_with("--") => {
                if from_report.is_empty() {
                    from_report = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            _ => return Err(format!("Unknown option: {arg}")),
        }
    }

    if from_report.is_empty() {
        return Err("Missing required argument: REPORT_FILE".to_string());
    }

    Ok(ReportArgs { from_report, json })
}
