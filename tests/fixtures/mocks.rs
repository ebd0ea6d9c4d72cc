// テスト用のクライアント実装
// ラベルごとの応答を台本またはゲートで制御し、完了順や削除のタイミングを決定的にする

use async_trait::async_trait;
use snap_caption::codec::{decode, EncodedPayload};
use snap_caption::core::{AnnotationClient, AnnotationError};
use std::collections::HashMap;
use std::sync::Mutex;
use tokio::sync::oneshot;

pub type Reply = Result<String, AnnotationError>;

fn label_of(payload: &EncodedPayload) -> String {
    let (bytes, _) = decode(payload).unwrap();
    String::from_utf8(bytes).unwrap()
}

/// 呼び出し履歴（ラベル）
#[derive(Debug, Default)]
pub struct CallLog(Mutex<Vec<String>>);

impl CallLog {
    fn record(&self, label: String) {
        self.0.lock().unwrap().push(label);
    }

    pub fn calls(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn count(&self, label: &str) -> usize {
        self.0.lock().unwrap().iter().filter(|l| *l == label).count()
    }
}

/// ラベルごとに固定の応答を返すクライアント
///
/// 台本にないラベルは`T-<label>`で成功する。
#[derive(Debug, Default)]
pub struct ScriptedClient {
    failures: HashMap<String, u16>,
    captions: HashMap<String, String>,
    pub log: CallLog,
}

impl ScriptedClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(mut self, label: &str, status: u16) -> Self {
        self.failures.insert(label.to_string(), status);
        self
    }

    pub fn captioning(mut self, label: &str, caption: &str) -> Self {
        self.captions.insert(label.to_string(), caption.to_string());
        self
    }
}

#[async_trait]
impl AnnotationClient for ScriptedClient {
    async fn annotate(&self, payload: &EncodedPayload) -> Result<String, AnnotationError> {
        let label = label_of(payload);
        self.log.record(label.clone());

        if let Some(status) = self.failures.get(&label) {
            return Err(AnnotationError::http_status(*status, format!("scripted failure for {label}")));
        }
        Ok(self
            .captions
            .get(&label)
            .cloned()
            .unwrap_or_else(|| format!("T-{label}")))
    }
}

/// テスト側が応答を送るまで完了しないクライアント
#[derive(Debug)]
pub struct GatedClient {
    gates: Mutex<HashMap<String, oneshot::Receiver<Reply>>>,
    pub log: CallLog,
}

/// ラベルごとの応答送信口
#[derive(Debug, Default)]
pub struct Gates(HashMap<String, oneshot::Sender<Reply>>);

impl Gates {
    /// 指定ラベルの呼び出しを完了させる
    pub fn release(&mut self, label: &str, reply: Reply) {
        let sender = self.0.remove(label).unwrap();
        // 受信側が既に破棄されていても構わない
        let _ = sender.send(reply);
    }

    pub fn succeed(&mut self, label: &str) {
        self.release(label, Ok(format!("T-{label}")));
    }

    pub fn fail(&mut self, label: &str) {
        self.release(label, Err(AnnotationError::http_status(500, "gated failure")));
    }
}

impl GatedClient {
    pub fn new(labels: &[&str]) -> (Self, Gates) {
        let mut receivers = HashMap::new();
        let mut senders = HashMap::new();
        for label in labels {
            let (tx, rx) = oneshot::channel();
            senders.insert(label.to_string(), tx);
            receivers.insert(label.to_string(), rx);
        }

        let client = Self {
            gates: Mutex::new(receivers),
            log: CallLog::default(),
        };
        (client, Gates(senders))
    }
}

#[async_trait]
impl AnnotationClient for GatedClient {
    async fn annotate(&self, payload: &EncodedPayload) -> Result<String, AnnotationError> {
        let label = label_of(payload);
        self.log.record(label.clone());

        let receiver = self.gates.lock().unwrap().remove(&label);
        match receiver {
            Some(receiver) => receiver
                .await
                .unwrap_or_else(|_| Err(AnnotationError::task_aborted("gate dropped"))),
            None => Err(AnnotationError::malformed_response(format!("no gate for {label}"))),
        }
    }
}
