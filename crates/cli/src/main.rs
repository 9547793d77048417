use api_shared::{PatientMapRes, PatientRes};
use clap::{Parser, Subcommand};
use patients_core::{
    config::patient_data_file_from_env_value, CoreConfig, Patient, PatientChanges,
    PatientFields, PatientId, PatientService, SortField, SortOrder,
};
use std::io::Write;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "patients")]
#[command(about = "Patient records CLI")]
struct Cli {
    /// Patient document (defaults to $PATIENT_DATA_FILE, then patients.json)
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    /// Print records as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all patients
    List,
    /// Show one patient
    Show {
        /// Patient identifier
        id: String,
    },
    /// Create a patient
    Create {
        /// Patient identifier, e.g. P001
        id: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        city: String,
        #[arg(long, allow_negative_numbers = true)]
        age: i64,
        /// male, female or other
        #[arg(long)]
        gender: String,
        /// Height in meters
        #[arg(long)]
        height: f64,
        /// Weight in kilograms
        #[arg(long)]
        weight: f64,
    },
    /// Change some fields of a patient
    Update {
        /// Patient identifier
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        city: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        age: Option<i64>,
        #[arg(long)]
        gender: Option<String>,
        /// Height in meters
        #[arg(long)]
        height: Option<f64>,
        /// Weight in kilograms
        #[arg(long)]
        weight: Option<f64>,
    },
    /// Delete a patient
    Delete {
        /// Patient identifier
        id: String,
    },
    /// List patients sorted by height, weight or bmi
    Sort {
        field: String,
        /// asc or desc
        #[arg(long, default_value = "asc")]
        order: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let stdout = std::io::stdout();
    run(cli, &mut stdout.lock())
}

fn run(cli: Cli, out: &mut impl Write) -> Result<(), Box<dyn std::error::Error>> {
    let data_file = cli.data_file.unwrap_or_else(|| {
        patient_data_file_from_env_value(std::env::var("PATIENT_DATA_FILE").ok())
    });
    let cfg = CoreConfig::new(data_file)?;
    let service = PatientService::from_config(&cfg);
    let json = cli.json;

    match cli.command {
        Some(Commands::List) => {
            let patients = service.list()?;
            if json {
                let map: PatientMapRes = patients.iter().collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&map)?)?;
            } else if patients.is_empty() {
                writeln!(out, "No patients found.")?;
            } else {
                for patient in patients.iter() {
                    writeln!(out, "{}", describe(patient))?;
                }
            }
        }
        Some(Commands::Show { id }) => {
            let patient = service.get(&PatientId::parse(&id)?)?;
            print_patient(out, &patient, json)?;
        }
        Some(Commands::Create {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        }) => {
            let fields = PatientFields {
                name,
                city,
                age,
                gender,
                height,
                weight,
            };
            let patient = service.create(PatientId::parse(&id)?, fields)?;
            if !json {
                writeln!(out, "Created patient {}", patient.id())?;
            }
            print_patient(out, &patient, json)?;
        }
        Some(Commands::Update {
            id,
            name,
            city,
            age,
            gender,
            height,
            weight,
        }) => {
            let id = PatientId::parse(&id)?;
            let changes = PatientChanges {
                name,
                city,
                age,
                gender,
                height,
                weight,
            };
            if changes.is_empty() {
                let patient = service.get(&id)?;
                if !json {
                    writeln!(out, "Nothing to update for {id}")?;
                }
                print_patient(out, &patient, json)?;
                return Ok(());
            }
            let patient = service.update(&id, &changes)?;
            if !json {
                writeln!(out, "Updated patient {}", patient.id())?;
            }
            print_patient(out, &patient, json)?;
        }
        Some(Commands::Delete { id }) => {
            let removed = service.delete(&PatientId::parse(&id)?)?;
            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&PatientRes::from(&removed))?)?;
            } else {
                writeln!(out, "Deleted patient {}", removed.id())?;
            }
        }
        Some(Commands::Sort { field, order }) => {
            let field = field.parse::<SortField>()?;
            let order = order.parse::<SortOrder>()?;
            let patients = service.sorted(field, order)?;
            if json {
                let res: Vec<PatientRes> = patients.iter().map(PatientRes::from).collect();
                writeln!(out, "{}", serde_json::to_string_pretty(&res)?)?;
            } else {
                for patient in &patients {
                    writeln!(out, "{}", describe(patient))?;
                }
            }
        }
        None => {
            writeln!(out, "Use 'patients --help' for commands")?;
        }
    }

    Ok(())
}

fn print_patient(
    out: &mut impl Write,
    patient: &Patient,
    json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if json {
        writeln!(out, "{}", serde_json::to_string_pretty(&PatientRes::from(patient))?)?;
    } else {
        writeln!(out, "{}", describe(patient))?;
    }
    Ok(())
}
