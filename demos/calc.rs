//! Interactive demo driving a co-processor over either transport.
//!
//! Usage: `calc [bus|stream] [device-path]`
//!
//! Prompts for two integers and an operator, sends one request, and
//! prints the record the peripheral hands back.

use std::io::{self, Write};

use copro::{Copro, Exchange, Op, Transport};

fn prompt(label: &str) -> io::Result<String> {
    print!("{label}");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().read_line(&mut line)?;
    Ok(line.trim().to_owned())
}

fn invalid(message: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, message)
}

fn read_request() -> io::Result<(i32, i32, Op)> {
    let x = prompt("Enter first number (x): ")?
        .parse()
        .map_err(|e| invalid(format!("not an integer: {e}")))?;
    let y = prompt("Enter second number (y): ")?
        .parse()
        .map_err(|e| invalid(format!("not an integer: {e}")))?;
    let op = prompt("Enter operator (+, -, *, /): ")?
        .bytes()
        .next()
        .and_then(Op::from_byte)
        .ok_or_else(|| invalid("invalid operator".to_owned()))?;
    Ok((x, y, op))
}

async fn run<T: Transport + Exchange>(
    mut client: Copro<T>,
) -> Result<(), Box<dyn std::error::Error>> {
    let (x, y, op) = read_request()?;

    client.connect().await?;
    let reply = client.compute(x, y, op).await?;
    println!("Received: {reply}");
    client.disconnect().await?;

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut args = std::env::args().skip(1);
    let kind = args.next().unwrap_or_else(|| "stream".to_owned());

    match kind.as_str() {
        "bus" => {
            let path = args.next().unwrap_or_else(|| "/dev/spidev1.0".to_owned());
            run(Copro::bus(path)).await
        }
        "stream" => {
            let path = args.next().unwrap_or_else(|| "/dev/ttyS1".to_owned());
            run(Copro::stream(path)).await
        }
        other => Err(format!("unknown transport {other:?} (expected \"bus\" or \"stream\")").into()),
    }
}
