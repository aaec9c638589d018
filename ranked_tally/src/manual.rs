/*!

This is the long-form manual for `ranked_tally` and `rcvtally`.

## Ballots

A ballot file is a JSON list of vote records. Each record is an object with:
* `rankings` (mandatory) the options in order of preference, most preferred first.
  It may be empty: the ballot is then counted in the total number of votes but
  does not support any option.
* `approvals` (optional) the options that the voter endorses, in any order. The
  approvals do not move votes around. They are only used to break ties when the
  `approval` tie breaking mode is selected.

```text
[
  {"rankings": ["Alice", "Bob"], "approvals": ["Alice", "Charlie"]},
  {"rankings": ["Charlie"]},
  {"rankings": []}
]
```

Records that do not follow these rules are dropped before the tally and listed
in the `skippedBallots` section of the summary. The reasons are:
* the record is not an object or has no `rankings` list
* a ranking is not a string, is not one of the options, or is repeated
* `approvals` is not a list, or one of its entries is not a string, is not
  one of the options, or is repeated

## Configuration

The configuration is a JSON file:

```text
{
  "outputSettings": {
    "contestName": "Board election",
    "contestDate": "2022-11-08"
  },
  "options": ["Alice", "Bob", "Charlie"],
  "ballotsFile": "ballots.json",
  "rules": {
    "tieBreaking": "approval",
    "maxRounds": 3
  }
}
```

* `options` the registered options. Their order matters: it is the order of the
  tallies in the output, and the order in which the options are considered when
  several of them are treated in the same round.
* `ballotsFile` the path of the ballot file, relative to the configuration file.
  It can be replaced by the `--input` flag.
* `rules.tieBreaking` either `eliminate_all` (all the options with the fewest
  votes are eliminated together) or `approval` (among the options with the fewest
  votes, only the ones with the lowest approval rating are eliminated). Any other
  value behaves like `eliminate_all`.
* `rules.maxRounds` the maximum number of rounds. It defaults to the number of
  options, which is always enough.

## Tabulation

In each round, the ballots count for their highest ranked option that is still
running. An option with at least half of all the ballots plus one (exhausted
ballots included) wins. Otherwise, the options with the fewest votes are
eliminated, subject to the tie breaking rule, and their ballots are transferred
to their next choice, or become exhausted. If all the remaining options would be
eliminated at once, the election ends without a winner (unbreakable tie).

## Output

The summary contains one entry per round with the tally, the status
(`Winner found`, `Elimination` or `Unbreakable tie`), the eliminated options,
the transfers of their votes (`exhausted` for the ballots with no choice left),
and the approval figures used for tie breaking. The keys of these objects
follow the order of the options, with `exhausted` last.

When a reference summary is given with `--reference`, the two summaries are
compared as JSON values, so the order of the keys in the reference file does
not matter.

*/
