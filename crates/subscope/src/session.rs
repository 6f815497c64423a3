use crate::clipboard::Clipboard;
use crate::controller::Controller;
use crate::print;
use crate::store::KvStore;
use crate::Result;
use std::io::Write;
use tokio::io::{self, AsyncBufReadExt, BufReader};
use tokio_stream::wrappers::LinesStream;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, instrument, warn};

#[derive(Debug, PartialEq, Eq)]
pub enum Input {
    Scan(String),
    Copy,
    Clear,
    Show,
    Help,
    Quit,
}

impl Input {
    /// A plain line is a domain to scan, `:`-prefixed lines are actions.
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            ":copy" | ":c" => Self::Copy,
            ":clear" | ":x" => Self::Clear,
            ":show" | ":s" => Self::Show,
            ":help" | ":h" | "?" => Self::Help,
            ":quit" | ":q" | ":exit" => Self::Quit,
            other => Self::Scan(other.to_string()),
        }
    }
}

fn print_help() {
    println!("Type a domain and press Enter to scan it.");
    println!("  :copy   copy every hostname of the table to the clipboard");
    println!("  :clear  forget the saved scan and empty the table");
    println!("  :show   print the table again");
    println!("  :quit   leave (the last scan is kept for next time)");
}

fn render<S: KvStore + ?Sized, C: Clipboard + ?Sized>(controller: &Controller<'_, S, C>) {
    print::print_table(controller.rows());
    print::print_status(controller.status());
    print::print_session_header(
        controller.scan_enabled(),
        controller.copy_label(),
        controller.copy_enabled(),
        controller.clear_visible(),
    );
}

fn prompt<S: KvStore + ?Sized, C: Clipboard + ?Sized>(controller: &Controller<'_, S, C>) {
    print!("subscope [{}]> ", controller.domain_input());
    let _ = std::io::stdout().flush();
}

/// Runs a scan while consuming whatever is typed meanwhile, so queued lines
/// cannot turn into a second scan once this one returns. Returns the number
/// of lines discarded.
pub async fn drive_scan<S, C, L>(
    controller: &mut Controller<'_, S, C>,
    domain: &str,
    lines: &mut L,
) -> usize
where
    S: KvStore + ?Sized,
    C: Clipboard + ?Sized,
    L: Stream<Item = std::io::Result<String>> + Unpin,
{
    let scan = controller.scan(domain);
    tokio::pin!(scan);

    let mut discarded = 0;
    let mut input_open = true;
    loop {
        tokio::select! {
            _ = &mut scan => break,
            line = lines.next(), if input_open => match line {
                Some(Ok(line)) => {
                    warn!("Scan running, ignoring {:?}", line.trim());
                    discarded += 1;
                }
                Some(Err(err)) => debug!("stdin error during scan: {}", err),
                None => input_open = false,
            },
        }
    }
    discarded
}

/// Interactive loop: reads commands from stdin while cloud detections land in the table.
#[instrument(name = "session", level = "info", skip_all)]
pub async fn run<S: KvStore + ?Sized, C: Clipboard + ?Sized>(
    controller: &mut Controller<'_, S, C>,
) -> Result<()> {
    print::separator("subscope");
    render(controller);
    prompt(controller);

    let mut lines = LinesStream::new(BufReader::new(io::stdin()).lines());

    loop {
        tokio::select! {
            Some(index) = controller.next_update(), if controller.detecting() => {
                if let Some(row) = controller.rows().get(index) {
                    println!();
                    print::print_update(row, controller.rows());
                    prompt(controller);
                }
            }
            line = lines.next() => {
                let Some(line) = line else {
                    debug!("stdin closed");
                    break;
                };
                match Input::parse(&line?) {
                    Input::Scan(domain) => {
                        print::print_status("Connecting...");
                        let discarded = drive_scan(controller, &domain, &mut lines).await;
                        if discarded > 0 {
                            print::print_status(&format!(
                                "Scan in progress: {} input line(s) ignored.",
                                discarded
                            ));
                        }
                        render(controller);
                    }
                    Input::Copy => {
                        if controller.copy() {
                            print::print_status(&format!(
                                "{} ({} hostnames)",
                                controller.copy_label(),
                                controller.rows().len()
                            ));
                        } else {
                            print::print_status(controller.status());
                        }
                    }
                    Input::Clear => {
                        controller.clear();
                        print::print_status(controller.status());
                    }
                    Input::Show => render(controller),
                    Input::Help => print_help(),
                    Input::Quit => break,
                }
                prompt(controller);
            }
        }
    }

    println!();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clipboard::memory::MemoryClipboard;
    use crate::controller::{Services, State};
    use crate::modules::subdomains::{crtsh::CrtSh, hackertarget::HackerTarget, otx::Otx};
    use crate::store::memory::MemoryStore;
    use reqwest::Client;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn plain_lines_are_scans() {
        assert_eq!(
            Input::parse("  example.com \n"),
            Input::Scan("example.com".to_string())
        );
        assert_eq!(Input::parse(""), Input::Scan(String::new()));
    }

    #[test]
    fn actions_have_short_forms() {
        assert_eq!(Input::parse(":copy"), Input::Copy);
        assert_eq!(Input::parse(":c"), Input::Copy);
        assert_eq!(Input::parse(":clear"), Input::Clear);
        assert_eq!(Input::parse(":q"), Input::Quit);
        assert_eq!(Input::parse("?"), Input::Help);
    }

    #[tokio::test]
    async fn lines_typed_during_a_scan_are_discarded() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/hostsearch/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string("a.example.com,1.1.1.1")
                    .set_delay(Duration::from_millis(300)),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("[]", "application/json"))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/v1/indicators/domain/example.com/passive_dns"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(r#"{"passive_dns": []}"#, "application/json"),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        let base_url = mock_server.uri();
        let services = Services {
            http_client: Client::new(),
            modules: vec![
                Box::new(HackerTarget::with_base_url(&base_url)),
                Box::new(CrtSh::with_base_url(&base_url)),
                Box::new(Otx::with_base_url(&base_url)),
            ],
            detector: None,
        };
        let mut store = MemoryStore::default();
        let mut clipboard = MemoryClipboard::default();
        let mut controller = Controller::new(&mut store, &mut clipboard, services);
        let mut lines = tokio_stream::iter(vec![
            Ok::<_, std::io::Error>("other.com".to_string()),
            Ok(":clear".to_string()),
        ]);

        let discarded = drive_scan(&mut controller, "example.com", &mut lines).await;

        assert_eq!(discarded, 2);
        assert_eq!(controller.state(), State::Displaying);
        assert_eq!(controller.status(), "Found 1 results.");
        assert!(controller.scan_enabled());
    }
}
