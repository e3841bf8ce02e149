use drop_bomb::DropBomb;
use quill_errors::{CancellationToken, Diagnostic};
use quill_syntax::SyntaxKind::{self, *};
use quill_syntax::{
    Arity, LiteralKind, NodeId, NodeStore, StoreError, SyntaxSet, TokenRange, XorNode,
};
use quill_tokenizer::TokenSnapshot;
use text_size::TextRange;

/// Internal per-production outcome. `Fail` participates in backtracking and
/// recovery; `Cancelled` tears straight through to the caller.
pub(crate) type ParseStep<T> = Result<T, Interrupt>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Interrupt {
    Fail(Fail),
    Cancelled,
}

/// A production failure: where the cursor was and which token kinds would
/// have been accepted there.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Fail {
    pub(crate) at: u32,
    pub(crate) expected: SyntaxSet,
}

impl Fail {
    /// Keeps the failure that consumed more tokens; at equal positions the
    /// expected sets are unioned.
    pub(crate) fn merge(self, other: Self) -> Self {
        match self.at.cmp(&other.at) {
            std::cmp::Ordering::Less => other,
            std::cmp::Ordering::Greater => self,
            std::cmp::Ordering::Equal => {
                Self { at: self.at, expected: self.expected.union(&other.expected) }
            }
        }
    }
}

pub struct ParseResult {
    pub store: NodeStore,
    pub outcome: ParseOutcome,
    pub diagnostics: Vec<Diagnostic>,
}

#[derive(Debug)]
pub enum ParseOutcome {
    /// The document parsed; diagnostics may still carry recovered errors.
    Tree(NodeId),
    /// No synchronization strategy survived. The furthest failure is the
    /// most likely intended production.
    Failure(ParseFailure),
    /// Cooperative cancellation; the partial tree in `store` stays
    /// addressable, open nodes included.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseFailure {
    pub token: u32,
    pub range: TextRange,
    pub expected: Vec<SyntaxKind>,
}

pub(crate) struct Parser<'t> {
    snapshot: &'t TokenSnapshot,
    pos: u32,
    store: NodeStore,
    stack: Vec<NodeId>,
    diagnostics: Vec<Diagnostic>,
    cancellation: Option<CancellationToken>,
    furthest: Option<Fail>,
}

impl<'t> Parser<'t> {
    pub(crate) fn new(snapshot: &'t TokenSnapshot, cancellation: Option<CancellationToken>) -> Self {
        Self {
            snapshot,
            pos: 0,
            store: NodeStore::new(),
            stack: Vec::new(),
            diagnostics: Vec::new(),
            cancellation,
            furthest: None,
        }
    }

    pub(crate) fn peek_kind(&self) -> SyntaxKind {
        self.snapshot.kind(self.pos)
    }

    pub(crate) fn at(&self, kind: SyntaxKind) -> bool {
        self.peek_kind() == kind
    }

    pub(crate) fn token_text(&self) -> &'t str {
        self.snapshot.token_text(self.pos)
    }

    pub(crate) fn pos(&self) -> u32 {
        self.pos
    }

    pub(crate) fn unexpected(&mut self, message: &str) {
        let range = self.token_text_range(self.pos);
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    /// Opens a production node under the current one. This is the
    /// per-production boundary, so cancellation is polled here.
    pub(crate) fn open(&mut self, kind: SyntaxKind, arity: Arity) -> ParseStep<Marker> {
        self.check_cancelled()?;

        let node = self.store.open_node(kind, arity);
        self.attach(node)?;
        self.stack.push(node);
        Ok(Marker::new(node, self.pos))
    }

    /// Opens a wrapper production that takes over an already-closed left
    /// operand, for left-nested operator chains.
    pub(crate) fn precede(
        &mut self,
        lhs: NodeId,
        kind: SyntaxKind,
        arity: Arity,
    ) -> ParseStep<Marker> {
        self.check_cancelled()?;

        let start = self
            .store
            .closed_node(lhs)
            .map(|node| node.range.start)
            .ok_or_else(|| self.structural())?;

        let node = self.store.open_node(kind, arity);
        if let Err(err) = self.store.reparent(lhs, node) {
            self.store.abandon_node(node);
            return Err(self.store_failed(err));
        }
        self.attach(node)?;
        self.stack.push(node);
        Ok(Marker::new(node, start))
    }

    fn attach(&mut self, node: NodeId) -> ParseStep<()> {
        if let Some(&parent) = self.stack.last()
            && let Err(err) = self.store.attach_child(parent, node)
        {
            self.store.abandon_node(node);
            return Err(self.store_failed(err));
        }

        Ok(())
    }

    /// Consumes the current token as a childless node of `kind`.
    pub(crate) fn leaf(
        &mut self,
        kind: SyntaxKind,
        literal: Option<LiteralKind>,
    ) -> ParseStep<NodeId> {
        debug_assert!(!self.at(EOF));

        let node = self.store.open_node(kind, Arity::Fixed(0));
        self.attach(node)?;
        let range = TokenRange::new(self.pos, self.pos + 1);
        self.pos += 1;

        match self.store.close_node(node, range, literal) {
            Ok(()) => Ok(node),
            Err(err) => {
                self.store.abandon_node(node);
                Err(self.store_failed(err))
            }
        }
    }

    pub(crate) fn expect_const(&mut self, kind: SyntaxKind) -> ParseStep<NodeId> {
        if self.at(kind) {
            self.leaf(CONSTANT, None)
        } else {
            Err(self.fail(SyntaxSet::new([kind])))
        }
    }

    pub(crate) fn eat_const(&mut self, kind: SyntaxKind) -> ParseStep<bool> {
        if self.at(kind) {
            self.leaf(CONSTANT, None)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }

    pub(crate) fn expect_eof(&mut self) -> ParseStep<()> {
        if self.at(EOF) { Ok(()) } else { Err(self.fail(SyntaxSet::new([EOF]))) }
    }

    /// Records a failure at the cursor, folding it into the
    /// furthest-failure tracker.
    pub(crate) fn fail(&mut self, expected: SyntaxSet) -> Interrupt {
        let fail = Fail { at: self.pos, expected };
        self.note(fail.clone());
        Interrupt::Fail(fail)
    }

    fn store_failed(&mut self, _err: StoreError) -> Interrupt {
        self.structural()
    }

    fn structural(&mut self) -> Interrupt {
        self.fail(SyntaxSet::EMPTY)
    }

    fn note(&mut self, fail: Fail) {
        self.furthest = Some(match self.furthest.take() {
            Some(best) => best.merge(fail),
            None => fail,
        });
    }

    pub(crate) fn check_cancelled(&self) -> ParseStep<()> {
        match &self.cancellation {
            Some(token) if token.is_cancelled() => Err(Interrupt::Cancelled),
            _ => Ok(()),
        }
    }

    pub(crate) fn checkpoint(&self) -> Checkpoint {
        Checkpoint {
            pos: self.pos,
            stack_len: self.stack.len(),
            top_children: self
                .stack
                .last()
                .map_or(0, |&top| self.store.children_of(XorNode::Open(top)).len()),
            diagnostics: self.diagnostics.len(),
        }
    }

    /// Strict backtracking: the cursor, the current parent's child list, and
    /// the diagnostics all rewind. Abandoned ids are never reused.
    pub(crate) fn restore(&mut self, checkpoint: &Checkpoint) {
        debug_assert_eq!(self.stack.len(), checkpoint.stack_len);

        if let Some(&top) = self.stack.last() {
            self.store.truncate_children(top, checkpoint.top_children);
        }

        self.pos = checkpoint.pos;
        self.diagnostics.truncate(checkpoint.diagnostics);
    }

    /// Combinatorial disambiguation: attempts every candidate from the same
    /// cursor, keeps the one that succeeds consuming the most tokens (ties
    /// go to the earlier-declared candidate), and re-runs it for real. When
    /// all fail, the merged furthest failure is surfaced.
    pub(crate) fn longest_of(
        &mut self,
        candidates: &[fn(&mut Parser<'_>) -> ParseStep<NodeId>],
    ) -> ParseStep<NodeId> {
        let checkpoint = self.checkpoint();
        let mut winner: Option<(usize, u32)> = None;
        let mut failure: Option<Fail> = None;

        for (index, candidate) in candidates.iter().enumerate() {
            match candidate(self) {
                Ok(_) => {
                    let consumed = self.pos - checkpoint.pos;
                    if winner.is_none_or(|(_, best)| consumed > best) {
                        winner = Some((index, consumed));
                    }
                }
                Err(Interrupt::Cancelled) => return Err(Interrupt::Cancelled),
                Err(Interrupt::Fail(fail)) => {
                    failure = Some(match failure.take() {
                        Some(best) => best.merge(fail),
                        None => fail,
                    });
                }
            }

            self.restore(&checkpoint);
        }

        match (winner, failure) {
            (Some((index, _)), _) => candidates[index](self),
            (None, Some(failure)) => Err(Interrupt::Fail(failure)),
            (None, None) => Err(self.structural()),
        }
    }

    /// Local recovery for one failed list item: diagnose, then wrap
    /// everything from the item's first token up to the next
    /// synchronization token into an `ERROR` node.
    pub(crate) fn recover_item(
        &mut self,
        start: u32,
        step: ParseStep<NodeId>,
        sync: &SyntaxSet,
    ) -> ParseStep<()> {
        match step {
            Ok(_) => Ok(()),
            Err(Interrupt::Fail(fail)) => {
                self.diagnose(&fail);

                while !self.at(EOF) && !sync.contains(self.peek_kind()) {
                    self.pos += 1;
                }

                if self.pos > start {
                    self.error_node(TokenRange::new(start, self.pos))?;
                }

                Ok(())
            }
            Err(Interrupt::Cancelled) => Err(Interrupt::Cancelled),
        }
    }

    /// A placeholder node covering tokens the recovery skipped.
    pub(crate) fn error_node(&mut self, range: TokenRange) -> ParseStep<NodeId> {
        let node = self.store.open_node(ERROR, Arity::Variable);
        self.attach(node)?;

        match self.store.close_node(node, range, None) {
            Ok(()) => Ok(node),
            Err(err) => {
                self.store.abandon_node(node);
                Err(self.store_failed(err))
            }
        }
    }

    /// Diagnoses a missing separator without consuming anything; the next
    /// item parses as usual.
    pub(crate) fn missing(&mut self, kind: SyntaxKind) {
        let fail = Fail { at: self.pos, expected: SyntaxSet::new([kind]) };
        self.note(fail.clone());
        self.diagnose(&fail);
    }

    pub(crate) fn diagnose(&mut self, fail: &Fail) {
        let mut expected = fail.expected.iter().map(SyntaxKind::repr).collect::<Vec<_>>();
        expected.dedup();
        let message = match expected.as_slice() {
            [] => "unexpected token".to_string(),
            [only] => format!("expected {only}"),
            [rest @ .., last] => format!("expected {} or {last}", rest.join(", ")),
        };

        let range = self.token_text_range(fail.at);
        self.diagnostics.push(Diagnostic::error(message, range));
    }

    fn token_text_range(&self, at: u32) -> TextRange {
        let end = (at + 1).min(self.snapshot.len()).max(at);
        self.snapshot.text_range(TokenRange::new(at, end))
    }

    pub(crate) fn finish(mut self, step: ParseStep<NodeId>) -> ParseResult {
        let outcome = match step {
            Ok(root) => {
                self.store.set_root(root);
                ParseOutcome::Tree(root)
            }
            Err(Interrupt::Cancelled) => {
                // Whatever partially parsed stays reachable from the
                // outermost open production.
                if let Some(&bottom) = self.stack.first() {
                    self.store.set_root(bottom);
                }
                ParseOutcome::Cancelled
            }
            Err(Interrupt::Fail(fail)) => {
                let fail = match self.furthest.take() {
                    Some(best) => best.merge(fail),
                    None => fail,
                };
                self.diagnose(&fail);

                ParseOutcome::Failure(ParseFailure {
                    token: fail.at,
                    range: self.token_text_range(fail.at),
                    expected: fail.expected.iter().collect(),
                })
            }
        };

        ParseResult { store: self.store, outcome, diagnostics: self.diagnostics }
    }
}

pub(crate) struct Checkpoint {
    pos: u32,
    stack_len: usize,
    top_children: usize,
    diagnostics: usize,
}

pub(crate) struct Marker {
    node: NodeId,
    start: u32,
    bomb: DropBomb,
}

impl Marker {
    fn new(node: NodeId, start: u32) -> Self {
        Self { node, start, bomb: DropBomb::new("Marker must be completed, abandoned, or kept") }
    }

    /// Routes a production body's outcome: close on success, abandon on
    /// failure, keep the node open when cancellation tears through so the
    /// partial tree stays addressable.
    pub(crate) fn finish(mut self, p: &mut Parser<'_>, body: ParseStep<()>) -> ParseStep<NodeId> {
        self.bomb.defuse();

        match body {
            Ok(()) => {
                debug_assert_eq!(p.stack.last(), Some(&self.node));
                p.stack.pop();

                let range = TokenRange::new(self.start, p.pos);
                match p.store.close_node(self.node, range, None) {
                    Ok(()) => Ok(self.node),
                    Err(err) => {
                        p.store.abandon_node(self.node);
                        Err(p.store_failed(err))
                    }
                }
            }
            Err(Interrupt::Fail(fail)) => {
                debug_assert_eq!(p.stack.last(), Some(&self.node));
                p.stack.pop();
                p.store.abandon_node(self.node);
                Err(Interrupt::Fail(fail))
            }
            Err(Interrupt::Cancelled) => {
                p.store.seal_node(self.node);
                Err(Interrupt::Cancelled)
            }
        }
    }
}
