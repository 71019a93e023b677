//! Minimal local HTTP server for exercising the scrapers without the network.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

pub struct Reply {
  pub status: u16,
  pub body: String,
  pub delay: Duration,
}

impl Reply {
  pub fn ok(body: impl Into<String>) -> Self {
    Self {
      status: 200,
      body: body.into(),
      delay: Duration::ZERO,
    }
  }

  pub fn status(status: u16) -> Self {
    Self {
      status,
      body: String::new(),
      delay: Duration::ZERO,
    }
  }

  pub fn after(mut self, delay: Duration) -> Self {
    self.delay = delay;
    self
  }
}

pub struct TestServer {
  pub url: String,
  requests: Arc<Mutex<Vec<String>>>,
}

impl TestServer {
  /// Paths (with query) requested so far, in arrival order
  pub fn requests(&self) -> Vec<String> {
    self.requests.lock().unwrap().clone()
  }
}

/// Serve every request with `handler(path_and_query)`, one task per connection.
pub async fn serve<F>(handler: F) -> TestServer
where
  F: Fn(&str) -> Reply + Send + Sync + 'static,
{
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let url = format!("http://{}", listener.local_addr().unwrap());
  let requests = Arc::new(Mutex::new(Vec::new()));
  let handler = Arc::new(handler);

  let seen = requests.clone();
  tokio::spawn(async move {
    while let Ok((mut stream, _)) = listener.accept().await {
      let handler = handler.clone();
      let seen = seen.clone();
      tokio::spawn(async move {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
          match stream.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
          }
        }

        let request = String::from_utf8_lossy(&buf);
        let path = request
          .lines()
          .next()
          .and_then(|line| line.split_whitespace().nth(1))
          .unwrap_or("/")
          .to_string();
        seen.lock().unwrap().push(path.clone());

        let reply = handler(&path);
        tokio::time::sleep(reply.delay).await;

        let response = format!(
          "HTTP/1.1 {} Test\r\nContent-Type: text/html\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
          reply.status,
          reply.body.len(),
          reply.body
        );
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
      });
    }
  });

  TestServer { url, requests }
}

/// URL of a local port with nothing listening on it
pub async fn unreachable_url() -> String {
  let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
  let addr = listener.local_addr().unwrap();
  drop(listener);
  format!("http://{}", addr)
}

/// A shelf page with one row per `(title, author)`
pub fn shelf_page(books: &[(&str, &str)]) -> String {
  let rows: String = books
    .iter()
    .map(|(title, author)| {
      format!(
        r#"<tr class="bookalike review">
          <td class="field title"><div class="value"><a href="/book/1">{title}</a></div></td>
          <td class="field author"><div class="value"><a href="/author/1">{author}</a></div></td>
          <td class="field avg_rating"><div class="value">4.00</div></td>
        </tr>"#
      )
    })
    .collect();

  format!(
    r#"<html class="desktop"><body><table id="books"><tbody>{}</tbody></table></body></html>"#,
    rows
  )
}
