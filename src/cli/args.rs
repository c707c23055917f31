//! CLI argument parsing

#[derive(Debug, Clone)]
pub struct CliArgs {
    pub command: Command,
}

#[derive(Debug, Clone)]
pub enum Command {
    Scan(ScanArgs),
    Import(ImportArgs),
}

#[derive(Debug, Clone)]
pub struct ScanArgs {
    pub path: String,
    pub json: bool,
}

#[derive(Debug, Clone)]
pub struct ImportArgs {
    pub path: String,
    pub database: String,
    pub rolling: bool,
    pub metastore: String,
    pub workers: usize,
    pub quiet: bool,
}

impl Default for ImportArgs {
    fn default() -> Self {
        Self {
            path: String::new(),
            database: String::new(),
            rolling: false,
            metastore: "zingest-meta.json".to_string(),
            workers: 4,
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
        "scan" => {
            let scan_args = parse_scan_args(&args[2..])?;
            Command::Scan(scan_args)
        }
        "import" => {
            let import_args = parse_import_args(&args[2..])?;
            Command::Import(import_args)
        }
        _ => return Err(format!("Unknown command: {}", args[1])),
    };

    Ok(CliArgs { command })
}

fn parse_scan_args(args: &[String]) -> Result<ScanArgs, String> {
    let mut path = String::new();
    let mut json = false;
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--json" => {
                json = true;
            }
            arg if !arg.starts_with("--") => {
                if path.is_empty() {
                    path = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if path.is_empty() {
        return Err("Missing required argument: PATH".to_string());
    }

    Ok(ScanArgs { path, json })
}

fn parse_import_args(args: &[String]) -> Result<ImportArgs, String> {
    let mut import_args = ImportArgs::default();
    let mut i = 0;

    while i < args.len() {
        match args[i].as_str() {
            "--database" => {
                i += 1;
                if i >= args.len() {
                    return Err("--database requires a value".to_string());
                }
                import_args.database.clone_from(&args[i]);
            }
            "--metastore" => {
                i += 1;
                if i >= args.len() {
                    return Err("--metastore requires a file path".to_string());
                }
                import_args.metastore.clone_from(&args[i]);
            }
            "--workers" => {
                i += 1;
                if i >= args.len() {
                    return Err("--workers requires a value".to_string());
                }
                let workers: usize = args[i]
                    .parse()
                    .map_err(|_| "--workers must be a positive integer".to_string())?;
                if workers == 0 {
                    return Err("--workers must be greater than zero".to_string());
                }
                import_args.workers = workers;
            }
            "--rolling" => {
                import_args.rolling = true;
            }
            "--quiet" => {
                import_args.quiet = true;
            }
            arg if !arg.starts_with("--") => {
                if import_args.path.is_empty() {
                    import_args.path = arg.to_string();
                } else {
                    return Err(format!("Unexpected argument: {arg}"));
                }
            }
            _ => return Err(format!("Unknown option: {}", args[i])),
        }
        i += 1;
    }

    if import_args.path.is_empty() {
        return Err("Missing required argument: PATH".to_string());
    }
    if import_args.database.is_empty() {
        return Err("Missing required option: --database".to_string());
    }

    Ok(import_args)
}
