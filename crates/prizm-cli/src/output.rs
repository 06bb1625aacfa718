use serde::Serialize;

#[derive(Serialize)]
pub struct CliResponse<T: Serialize> {
    pub success: bool,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Serialize)]
pub struct ListResponse<T: Serialize> {
    pub items: Vec<T>,
    pub count: usize,
}

fn respond<T: Serialize>(success: bool, data: Option<T>, error: Option<String>) -> String {
    let response = CliResponse {
        success,
        api_version: env!("CARGO_PKG_VERSION"),
        data,
        error,
    };
    serde_json::to_string(&response).unwrap_or_else(|err| {
        format!(
            r#"{{"success":false,"api_version":"{}","error":"Failed to serialize response: {}"}}"#,
            env!("CARGO_PKG_VERSION"),
            err
        )
    })
}

pub fn output_success<T: Serialize>(data: T) {
    println!("{}", respond(true, Some(data), None));
}

pub fn output_list<T: Serialize>(items: Vec<T>) {
    let count = items.len();
    output_success(ListResponse { items, count });
}

/// Prints a failed response that still carries data to stdout, then exits with code 1.
pub fn output_failure<T: Serialize>(message: &str, data: T) -> ! {
    println!("{}", respond(false, Some(data), Some(message.to_string())));
    std::process::exit(1);
}

/// Prints an error response to stderr and exits with code 1.
pub fn output_error(message: &str) -> ! {
    eprintln!("{}", respond::<()>(false, None, Some(message.to_string())));
    std::process::exit(1);
}
