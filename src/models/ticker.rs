use serde::{Deserialize, Serialize};

/// 股票主数据（来自 tickers.json，只读）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerMeta {
    #[serde(skip)]
    pub ticker: String,
    pub name: String,
    pub class: String,
}

/// 市场板块
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    Prime,
    Standard,
    Growth,
}

impl Segment {
    /// 运行模式代码 -> 板块，未知模式返回 None
    pub fn from_mode(mode: &str) -> Option<Segment> {
        match mode {
            "P" => Some(Segment::Prime),
            "S" => Some(Segment::Standard),
            "G" => Some(Segment::Growth),
            _ => None,
        }
    }
}

/// Classification labels recognised for each segment.
///
/// A ticker belongs to a segment when its `class` contains any of the
/// segment's labels.
#[derive(Debug, Clone)]
pub struct SegmentTable {
    entries: Vec<(Segment, Vec<String>)>,
}

impl SegmentTable {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// 设置某板块的标签（覆盖已有的设置）
    pub fn with_labels(mut self, segment: Segment, labels: &[&str]) -> Self {
        let labels: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        if let Some(entry) = self.entries.iter_mut().find(|(s, _)| *s == segment) {
            entry.1 = labels;
        } else {
            self.entries.push((segment, labels));
        }
        self
    }

    pub fn labels(&self, segment: Segment) -> &[String] {
        self.entries
            .iter()
            .find(|(s, _)| *s == segment)
            .map(|(_, labels)| labels.as_slice())
            .unwrap_or(&[])
    }

    pub fn matches(&self, segment: Segment, class: &str) -> bool {
        self.labels(segment)
            .iter()
            .any(|label| !label.is_empty() && class.contains(label.as_str()))
    }
}

impl Default for SegmentTable {
    fn default() -> Self {
        Self::new()
            .with_labels(Segment::Prime, &["プライム", "Prime"])
            .with_labels(Segment::Standard, &["スタンダード", "Standard"])
            .with_labels(Segment::Growth, &["グロース", "Growth"])
    }
}
