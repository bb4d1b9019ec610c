// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

//! Courier CLI - compose a request, print the decoded response

use std::env;
use std::process::ExitCode;

use courier::http::{ClientConfig, Decoded, RequestBuilder};

#[tokio::main]
async fn main() -> ExitCode {
    // Initialize logging
    let filter = tracing_subscriber::EnvFilter::from_default_env();
    let filter = match "courier=info".parse() {
        Ok(directive) => filter.add_directive(directive),
        Err(_) => filter,
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        print_usage();
        return ExitCode::from(1);
    }

    let (headers, rest) = match split_headers(&args[2..]) {
        Ok(parsed) => parsed,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::from(1);
        }
    };

    let client = ClientConfig::new();

    let request = match args[1].as_str() {
        "get" => {
            if rest.is_empty() {
                eprintln!("Usage: courier get <url> [-H name:value]...");
                return ExitCode::from(1);
            }
            client.get(rest[0].as_str())
        }
        "post-json" => {
            if rest.len() < 2 {
                eprintln!("Usage: courier post-json <url> <json> [-H name:value]...");
                return ExitCode::from(1);
            }
            client.post(rest[0].as_str()).add_post_json(rest[1].as_str())
        }
        "post-form" => {
            if rest.is_empty() {
                eprintln!("Usage: courier post-form <url> key=value... [-H name:value]...");
                return ExitCode::from(1);
            }
            let mut fields = Vec::new();
            for field in &rest[1..] {
                match field.split_once('=') {
                    Some((key, value)) => fields.push((key.to_string(), value.to_string())),
                    None => {
                        eprintln!("Invalid form field (expected key=value): {}", field);
                        return ExitCode::from(1);
                    }
                }
            }
            client.post(rest[0].as_str()).add_posts(fields)
        }
        "--help" | "-h" | "help" => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        "--version" | "-v" | "version" => {
            println!("courier {}", courier::VERSION);
            return ExitCode::SUCCESS;
        }
        cmd => {
            eprintln!("Unknown command: {}", cmd);
            print_usage();
            return ExitCode::from(1);
        }
    };

    run(request.add_headers(headers)).await
}

fn print_usage() {
    println!(
        r#"Courier - HTTP request composer

USAGE:
    courier <COMMAND> [ARGS] [-H name:value]...

COMMANDS:
    get <url>                   Send a GET request
    post-json <url> <json>      POST a JSON body
    post-form <url> key=value   POST form fields
    help                        Show this help message
    version                     Show version information

EXAMPLES:
    courier get "https://httpbin.org/get" -H "Accept: application/json"
    courier post-json https://httpbin.org/post '{{"name":"courier"}}'
    courier post-form https://httpbin.org/post user=ann remember=true
"#
    );
}

/// Pull `-H name:value` pairs out of the argument list
fn split_headers(args: &[String]) -> Result<(Vec<(String, String)>, Vec<String>), String> {
    let mut headers = Vec::new();
    let mut rest = Vec::new();
    let mut iter = args.iter();

    while let Some(arg) = iter.next() {
        if arg == "-H" || arg == "--header" {
            let raw = iter
                .next()
                .ok_or_else(|| format!("{} requires a value", arg))?;
            let (name, value) = raw
                .split_once(':')
                .ok_or_else(|| format!("Invalid header (expected name:value): {}", raw))?;
            headers.push((name.trim().to_string(), value.trim().to_string()));
        } else {
            rest.push(arg.clone());
        }
    }

    Ok((headers, rest))
}

async fn run(mut request: RequestBuilder) -> ExitCode {
    let response = match request.get_http_response().await {
        Ok(response) => response,
        Err(e) => {
            eprintln!("Request failed: {}", e);
            return ExitCode::from(1);
        }
    };

    println!("=== Response ===");
    println!("Status: {}", response.status);
    println!("URL: {}", response.url);
    println!("Content-Type: {}", response.content_type().unwrap_or("-"));
    println!("Time: {}ms", response.response_time_ms);
    println!();

    match response.decode() {
        Ok(Decoded::Json(value)) => match serde_json::to_string_pretty(&value) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{}", value),
        },
        Ok(Decoded::Text(text)) => println!("{}", text),
        Err(e) => {
            eprintln!("Failed to decode response: {}", e);
            return ExitCode::from(1);
        }
    }

    if response.is_success() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    }
}
